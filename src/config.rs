use std::time::Duration;

use crate::feed::loader::Locator;

/// Feed used when no locator is given on the command line or in the environment.
pub const DEFAULT_FEED_URL: &str =
    "https://export.arxiv.org/api/query?search_query=cat:cs.AI&start=0&max_results=10";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Process-wide settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub locator: Locator,

    /// HTTP request timeout; file reads are not bounded
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn new(locator: Option<&str>, timeout_secs: u64) -> Self {
        Self {
            locator: Locator::parse(locator.unwrap_or(DEFAULT_FEED_URL)),
            fetch_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, DEFAULT_TIMEOUT_SECS)
    }
}
