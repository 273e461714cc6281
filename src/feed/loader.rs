//! Source loaders: turn a [`Locator`] into raw document bytes.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::traits::{FetchError, SourceLoader};

/// Where the feed comes from, decided once from the locator string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Url(String),
    Path(PathBuf),
}

impl Locator {
    /// Anything starting with `http` is a URL; everything else is a path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http") {
            Locator::Url(raw.to_string())
        } else {
            Locator::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Url(url) => f.write_str(url),
            Locator::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches URLs with a single GET and a fixed request timeout.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(http_err)?;
        Ok(bytes.to_vec())
    }
}

/// Reads the whole file as bytes. No timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl FileLoader {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        tokio::fs::read(path).await.map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Default loader: HTTP for URLs, filesystem for paths.
#[derive(Debug, Clone)]
pub struct LocatorLoader {
    http: HttpLoader,
    file: FileLoader,
}

impl LocatorLoader {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpLoader::new(timeout)?,
            file: FileLoader,
        })
    }
}

#[async_trait]
impl SourceLoader for HttpLoader {
    fn loader_name(&self) -> &'static str {
        "http"
    }

    async fn load(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
        match locator {
            Locator::Url(url) => self.fetch(url).await,
            Locator::Path(_) => Err(FetchError::UnsupportedLocator {
                loader: self.loader_name(),
                locator: locator.to_string(),
            }),
        }
    }
}

#[async_trait]
impl SourceLoader for FileLoader {
    fn loader_name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
        match locator {
            Locator::Path(path) => self.read(path).await,
            Locator::Url(_) => Err(FetchError::UnsupportedLocator {
                loader: self.loader_name(),
                locator: locator.to_string(),
            }),
        }
    }
}

#[async_trait]
impl SourceLoader for LocatorLoader {
    fn loader_name(&self) -> &'static str {
        "locator"
    }

    async fn load(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
        let loader: &dyn SourceLoader = match locator {
            Locator::Url(_) => &self.http,
            Locator::Path(_) => &self.file,
        };

        info!(source = %locator, loader = loader.loader_name(), "Loading feed");
        match loader.load(locator).await {
            Ok(bytes) => {
                info!(source = %locator, bytes = bytes.len(), "Feed loaded");
                Ok(bytes)
            }
            Err(e) => {
                error!(source = %locator, error = %e, "Failed to load feed");
                Err(e)
            }
        }
    }
}
