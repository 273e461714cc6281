use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::feed::loader::Locator;

/// Failure to obtain the raw feed bytes. Aborts the run with an empty result.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} when fetching {url}")]
    Status { url: String, status: u16 },
    #[error("The {loader} loader cannot load {locator}")]
    UnsupportedLocator {
        loader: &'static str,
        locator: String,
    },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to parse the top-level document. Fatal for the run.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Unexpected end of document inside <{0}>")]
    UnclosedElement(String),
    #[error("Document has no root element")]
    MissingRoot,
    #[error("Element <{0}> follows the root element")]
    ContentAfterRoot(String),
    #[error("Parser task failed: {0}")]
    Task(String),
}

/// Reason a single entry was skipped. Never aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry has no <title>")]
    MissingTitle,
    #[error("entry title is empty")]
    EmptyTitle,
    #[error("entry has no <link rel=\"alternate\">")]
    MissingAlternateLink,
    #[error("alternate link has no href")]
    MissingHref,
}

#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// Short name used in log lines (e.g., "http", "file").
    fn loader_name(&self) -> &'static str;

    /// Resolves the locator to the raw document bytes.
    async fn load(&self, locator: &Locator) -> Result<Vec<u8>, FetchError>;
}
