// src/config.rs
// =============================================================================
// Validated crawl configuration.
//
// The CLI gives us strings; this module turns them into typed values and
// rejects anything that would make the crawl meaningless (bad seed URL,
// zero workers, a regex that does not compile...). Everything is checked
// here, before the first request goes out, so a configuration problem is
// always reported up front with a non-zero exit code.
//
// Once built, a CrawlConfig is read-only and passed explicitly to the parts
// that need it (crawler, fetcher, output sink).
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::cli::Cli;
use crate::crawl::CrawlLimits;
use crate::error::ConfigError;
use crate::fetch::RequestOptions;
use crate::output::OutputFormat;

/// Static assets we never want to follow by default.
pub const DEFAULT_EXCLUDE: &str =
    r"(?i)\.(css|js|jpg|jpeg|png|gif|pdf|zip|tar|gz|bz2|mp3|mp4)$";
pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Canonical seed URL (depth 0).
    pub seed: Url,
    pub limits: CrawlLimits,
    /// Size of the worker pool; also the cap on simultaneous fetches.
    pub concurrency: usize,
    /// Optional deadline for the whole crawl.
    pub max_time: Option<Duration>,
    /// Parse bodies of 4xx/5xx responses for links too.
    pub follow_error_pages: bool,
    pub exclude: Regex,
    pub request: RequestOptions,
    pub format: OutputFormat,
    /// None means stdout.
    pub output: Option<PathBuf>,
}

impl CrawlConfig {
    /// A configuration with the same defaults as the command line.
    pub fn new(seed: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            seed: parse_seed(seed)?,
            limits: CrawlLimits {
                max_depth: DEFAULT_MAX_DEPTH,
                max_pages: 0,
            },
            concurrency: DEFAULT_CONCURRENCY,
            max_time: None,
            follow_error_pages: true,
            exclude: Regex::new(DEFAULT_EXCLUDE)?,
            request: RequestOptions::new(DEFAULT_TIMEOUT),
            format: OutputFormat::Text,
            output: None,
        })
    }

    /// Validates parsed command-line arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if cli.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut config = Self::new(&cli.url)?;
        config.limits = CrawlLimits {
            max_depth: cli.depth,
            max_pages: cli.max_pages,
        };
        config.concurrency = cli.concurrency;
        // A zero deadline would cancel the crawl before the seed is
        // fetched; treat it as "no deadline" like a zero depth.
        config.max_time = cli.max_time.filter(|d| !d.is_zero());
        config.follow_error_pages = !cli.skip_error_pages;
        if cli.exclude != DEFAULT_EXCLUDE {
            config.exclude = Regex::new(&cli.exclude)?;
        }

        config.request.timeout = cli.timeout;
        config.request.user_agent = cli.user_agent.clone().filter(|ua| !ua.trim().is_empty());
        config.request.headers = cli.headers.clone();
        config.request.cookies = cli.cookies.clone();

        config.format = cli.format;
        config.output = cli.output.clone();
        Ok(config)
    }
}

// The seed goes through the same canonicalisation as discovered links
// (fragment dropped, scheme checked), but never through the exclusion
// pattern: the user asked for it explicitly.
fn parse_seed(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidSeed {
            url: raw.to_string(),
            reason: "URL is empty".to_string(),
        });
    }

    let mut url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidSeed {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidSeed {
            url: raw.to_string(),
            reason: "URL has no host".to_string(),
        });
    }

    url.set_fragment(None);
    Ok(url)
}
