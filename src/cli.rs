// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The flag names follow the classic prowl tool (-u, -ua, -H, -C, -d, -t, -e,
// -f, -o), plus a few extras for the worker pool and limits. clap only
// understands single-letter short flags, so the two-letter `-ua` flag is
// rewritten to `--ua` before parsing (see `normalize_args`).
//
// Nothing here touches the network or the filesystem: the parsed `Cli` is
// turned into a validated `CrawlConfig` in src/config.rs.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_EXCLUDE, DEFAULT_MAX_DEPTH};
use crate::error::ConfigError;
use crate::output::OutputFormat;

// The whole CLI is a single command - there are no subcommands.
#[derive(Parser, Debug)]
#[command(
    name = "prowl",
    version,
    about = "Crawl a website with a bounded pool of workers and stream every page",
    long_about = "prowl starts from a seed URL, follows links found in HTML, JavaScript and \
                  Markdown up to a depth and page limit, and writes each fetched page as \
                  JSON lines, CSV or plain text."
)]
pub struct Cli {
    /// Seed URL to start crawling from (required)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: String,

    /// User-Agent header sent with every request (also accepted as -ua)
    #[arg(long = "ua", value_name = "AGENT")]
    pub user_agent: Option<String>,

    /// Custom headers, ';'-separated "Name: Value" pairs
    #[arg(short = 'H', long = "headers", value_name = "HEADERS")]
    pub headers: Option<String>,

    /// Cookies, ';'-separated "name=value" pairs
    #[arg(short = 'C', long = "cookies", value_name = "COOKIES")]
    pub cookies: Option<String>,

    /// Maximum crawl depth (the seed is depth 0; 0 disables the limit)
    #[arg(short = 'd', long = "depth", default_value_t = DEFAULT_MAX_DEPTH)]
    pub depth: usize,

    /// Per-request timeout (e.g. 30s, 500ms, 2m)
    #[arg(short = 't', long = "timeout", default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Regex; discovered links matching it are not followed
    #[arg(short = 'e', long = "exclude", default_value = DEFAULT_EXCLUDE)]
    pub exclude: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write results to this file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short = 'c', long = "concurrency", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Maximum number of pages to fetch (0 = unlimited)
    #[arg(short = 'm', long = "max-pages", default_value_t = 0)]
    pub max_pages: usize,

    /// Stop the whole crawl after this long (e.g. 5m)
    #[arg(long = "max-time", value_parser = parse_duration)]
    pub max_time: Option<Duration>,

    /// Do not look for links in pages that returned a non-2xx status
    #[arg(long = "skip-error-pages")]
    pub skip_error_pages: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parses the process arguments, accepting the legacy `-ua` spelling.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args()))
    }
}

// Rewrites multi-letter single-dash flags into the long form clap expects.
// Only `-ua` needs this today.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-ua" || arg.starts_with("-ua=") {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

/// Parses a Go-style duration: `30s`, `500ms`, `2m`, `1h`, `1.5s`, or a
/// bare number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(raw.to_string());

    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number.parse().map_err(|_| invalid())?;
    let seconds = match unit.trim() {
        "" | "s" => value,
        "ms" => value / 1000.0,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(invalid()),
    };

    // Overflowing, negative or non-finite values are errors, not panics.
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let args = std::iter::once("prowl")
            .chain(args.iter().copied())
            .map(String::from);
        Cli::try_parse_from(normalize_args(args))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["-u", "http://example.com"]).unwrap();
        assert_eq!(cli.url, "http://example.com");
        assert_eq!(cli.depth, 5);
        assert_eq!(cli.timeout, Duration::from_secs(30));
        assert_eq!(cli.exclude, DEFAULT_EXCLUDE);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.concurrency, 10);
        assert_eq!(cli.max_pages, 0);
        assert!(cli.output.is_none());
        assert!(cli.max_time.is_none());
    }

    #[test]
    fn test_url_is_required() {
        assert!(parse(&["-d", "2"]).is_err());
    }

    #[test]
    fn test_legacy_user_agent_flag() {
        let cli = parse(&["-u", "http://example.com", "-ua", "prowl-bot/1.0"]).unwrap();
        assert_eq!(cli.user_agent.as_deref(), Some("prowl-bot/1.0"));
    }

    #[test]
    fn test_all_short_flags() {
        let cli = parse(&[
            "-u", "https://example.com",
            "-H", "X-A: 1; X-B: 2",
            "-C", "a=1; b=2",
            "-d", "2",
            "-t", "500ms",
            "-e", r"\.png$",
            "-f", "json",
            "-o", "out.jsonl",
        ])
        .unwrap();
        assert_eq!(cli.headers.as_deref(), Some("X-A: 1; X-B: 2"));
        assert_eq!(cli.cookies.as_deref(), Some("a=1; b=2"));
        assert_eq!(cli.depth, 2);
        assert_eq!(cli.timeout, Duration::from_millis(500));
        assert_eq!(cli.exclude, r"\.png$");
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.output, Some(PathBuf::from("out.jsonl")));
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        assert!(parse(&["-u", "http://example.com", "-f", "xml"]).is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("7").unwrap(), Duration::from_secs(7));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("10 parsecs").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        assert!(matches!(
            parse_duration("99999999999999999999s"),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(parse_duration("99999999999999999h").is_err());
    }
}
