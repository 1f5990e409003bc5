// src/main.rs
// =============================================================================
// This is the entry point of the prowl CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Turn them into a validated CrawlConfig
// 3. Build the HTTP fetcher and open the output destination
// 4. Run the crawler, streaming results into the sink as they arrive
// 5. Exit with a proper code (0 = crawl ran, 1 = runtime failure,
//    2 = bad configuration)
//
// Rust concepts used:
// - async/await: many requests are in flight at once
// - channels: workers hand results to the sink through a bounded mpsc queue
// - anyhow::Result: any error can bubble up here with `?`
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - validated crawl settings
mod crawl;    // src/crawl/ - frontier, workers, orchestration
mod error;    // src/error.rs - typed errors
mod extract;  // src/extract/ - link extraction and URL normalization
mod fetch;    // src/fetch/ - HTTP fetching
mod logging;  // src/logging.rs - tracing setup
mod output;   // src/output.rs - JSON / CSV / text result sink

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cli::Cli;
use config::CrawlConfig;
use crawl::Crawler;
use error::{ConfigError, SinkError};
use fetch::HttpFetcher;
use output::{open_output, ResultSink};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            // Configuration problems are the user's to fix; everything else
            // is a failure while running.
            if e.downcast_ref::<ConfigError>().is_some() {
                2
            } else {
                1
            }
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    // clap exits with code 2 on its own for usage errors and --help.
    let cli = Cli::parse_args();
    logging::init_logging(cli.verbose);

    let config = CrawlConfig::from_cli(&cli)?;
    let fetcher = HttpFetcher::new(&config.request)?;

    // Open the destination before the first request, so a bad -o path
    // fails fast.
    let writer = open_output(config.output.as_deref()).context("cannot open output")?;
    let sink = ResultSink::new(config.format, writer)?;

    let crawler = Crawler::new(&config, Arc::new(fetcher));
    let (results, receiver) = crawler.result_channel();
    let sink = sink.spawn(receiver);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, stopping crawl");
                cancel.cancel();
            }
        });
    }

    let summary = crawler.run(results, cancel).await;

    // The crawler has dropped every sender, so the sink sees the end of the
    // stream, flushes, and returns.
    let written = sink
        .await
        .map_err(|e| SinkError::Join(e.to_string()))?
        .context("writing results failed")?;

    info!(
        written,
        links_found = summary.links_found,
        duplicates = summary.duplicate_links,
        excluded = summary.excluded_links,
        malformed = summary.malformed_links,
        unsupported = summary.unsupported_links,
        "results written"
    );

    Ok(())
}
