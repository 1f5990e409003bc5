// src/output.rs
// =============================================================================
// The result sink: turns the stream of CrawlResults into JSON lines, CSV or
// plain text, on stdout or in a file.
//
// How it plugs in:
// - main opens the destination BEFORE crawling starts, so "cannot create
//   output file" is reported before any request is made
// - the sink runs on a blocking thread (file and stdout writes are blocking
//   I/O) and drains the result channel until the crawler closes it
// - if a write fails, the sink stops and drops the receiver; the workers
//   notice on their next send and the crawl is cancelled
//
// Results are written in the order they arrive. The writer is flushed when
// the stream ends; a file is closed when the sink is dropped, on every path.
// =============================================================================

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::crawl::CrawlResult;
use crate::error::SinkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// One CSV record per result, with a header row
    Csv,
    /// URL line followed by content line
    Text,
}

// Field order here is the key order in the output.
#[derive(Serialize)]
struct JsonRecord<'a> {
    url: &'a str,
    content: &'a str,
    depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a CrawlResult> for JsonRecord<'a> {
    fn from(result: &'a CrawlResult) -> Self {
        Self {
            url: result.url.as_str(),
            content: &result.body,
            depth: result.depth,
            status: result.status,
            content_type: result.content_type.as_deref(),
            error: result.error.as_ref().map(ToString::to_string),
        }
    }
}

enum Encoder<W: Write> {
    Json(W),
    Csv(csv::Writer<W>),
    Text(W),
}

pub struct ResultSink<W: Write> {
    encoder: Encoder<W>,
    written: usize,
}

/// Opens the destination: a new file at `path`, or stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send>, SinkError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| SinkError::Create {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

impl<W: Write> ResultSink<W> {
    pub fn new(format: OutputFormat, writer: W) -> Result<Self, SinkError> {
        let encoder = match format {
            OutputFormat::Json => Encoder::Json(writer),
            OutputFormat::Text => Encoder::Text(writer),
            // Headerless `url,content` records, like the classic tool.
            OutputFormat::Csv => Encoder::Csv(
                csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(writer),
            ),
        };
        Ok(Self { encoder, written: 0 })
    }

    pub fn write(&mut self, result: &CrawlResult) -> Result<(), SinkError> {
        match &mut self.encoder {
            Encoder::Json(out) => {
                serde_json::to_writer(&mut *out, &JsonRecord::from(result))?;
                out.write_all(b"\n")?;
            }
            Encoder::Csv(csv) => {
                // A failed fetch has no body; its content cell carries the
                // error the same way the text format does.
                let content = match &result.error {
                    Some(error) => format!("error: {}", error),
                    None => result.body.clone(),
                };
                csv.write_record([result.url.as_str(), content.as_str()])?;
            }
            Encoder::Text(out) => {
                writeln!(out, "{}", result.url)?;
                match &result.error {
                    Some(error) => writeln!(out, "error: {}", error)?,
                    None => writeln!(out, "{}", result.body)?,
                }
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Flushes everything and hands the writer back.
    pub fn finish(self) -> Result<W, SinkError> {
        match self.encoder {
            Encoder::Json(mut out) | Encoder::Text(mut out) => {
                out.flush()?;
                Ok(out)
            }
            Encoder::Csv(csv) => {
                let mut out = csv
                    .into_inner()
                    .map_err(|e| SinkError::Io(io::Error::new(e.error().kind(), e.error().to_string())))?;
                out.flush()?;
                Ok(out)
            }
        }
    }
}

impl<W: Write + Send + 'static> ResultSink<W> {
    /// Drains `results` on a blocking thread until the channel closes.
    /// Resolves to the number of results written.
    pub fn spawn(mut self, mut results: mpsc::Receiver<CrawlResult>) -> JoinHandle<Result<usize, SinkError>> {
        tokio::task::spawn_blocking(move || {
            while let Some(result) = results.blocking_recv() {
                self.write(&result)?;
            }
            let written = self.written;
            // Flush even on a clean end of stream; a BufWriter would
            // otherwise swallow the final write error on drop.
            self.finish()?;
            Ok(written)
        })
    }
}
