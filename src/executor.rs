use std::io::Write;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::feed::loader::{Locator, LocatorLoader};
use crate::feed::pipeline::{FeedPipeline, FeedRun, PipelineError};
use crate::report::{write_publications, ReportError};
use crate::traits::{FetchError, ParseError, SourceLoader};

/// Process exit status when the run completes, with or without publications.
pub const EXIT_OK: u8 = 0;

/// Process exit status when the feed document cannot be parsed.
pub const EXIT_PARSE_FAILURE: u8 = 1;

/// Maps a run outcome to the process exit status.
pub fn exit_status(outcome: &Result<FeedRun, ParseError>) -> u8 {
    match outcome {
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_PARSE_FAILURE,
    }
}

/// Runs the pipeline and applies the run-level error policy.
///
/// Fetch errors end the run with no publications; only a document that
/// fails to parse is reported back as an error.
pub struct FeedExecutor<L: SourceLoader> {
    pipeline: FeedPipeline<L>,
}

impl FeedExecutor<LocatorLoader> {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::new(LocatorLoader::new(config.fetch_timeout)?))
    }
}

impl<L: SourceLoader> FeedExecutor<L> {
    pub fn new(loader: L) -> Self {
        Self {
            pipeline: FeedPipeline::new(loader),
        }
    }

    #[instrument(skip(self, locator), fields(source = %locator))]
    pub async fn run(&self, locator: &Locator) -> Result<FeedRun, ParseError> {
        info!("Starting feed run");

        match self.pipeline.execute(locator).await {
            Ok(run) => {
                info!(
                    publications = run.stats.publications,
                    skipped = run.stats.entries_skipped,
                    duration_ms = run.stats.total_duration_ms,
                    "Finished feed run"
                );
                Ok(run)
            }
            Err(PipelineError::Fetch(e)) => {
                error!(error = %e, "Fetch failed, no publications produced");
                Ok(FeedRun::empty())
            }
            Err(PipelineError::Parse(e)) => {
                error!(error = %e, "Feed document could not be parsed");
                Err(e)
            }
        }
    }

    /// Runs the feed, writes the report and returns the exit status.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] only if the report cannot be written.
    pub async fn report<W: Write>(&self, locator: &Locator, writer: W) -> Result<u8, ReportError> {
        let outcome = self.run(locator).await;
        if let Ok(run) = &outcome {
            write_publications(writer, &run.publications)?;
        }
        Ok(exit_status(&outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct UnreachableLoader;

    #[async_trait]
    impl SourceLoader for UnreachableLoader {
        fn loader_name(&self) -> &'static str {
            "unreachable"
        }

        async fn load(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Status {
                url: locator.to_string(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_error_yields_empty_run() {
        let executor = FeedExecutor::new(UnreachableLoader);
        let run = executor
            .run(&Locator::parse("http://feeds.invalid/atom"))
            .await
            .unwrap();

        assert!(run.publications.is_empty());
        assert!(run.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("missing.xml").to_str(), 10);

        let executor = FeedExecutor::from_config(&config).unwrap();
        let run = executor.run(&config.locator).await.unwrap();
        assert!(run.publications.is_empty());
    }

    fn feed_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, contents).unwrap();
        file
    }

    async fn report(locator: &str) -> (u8, Vec<u8>) {
        let config = Config::new(Some(locator), 2);
        let executor = FeedExecutor::from_config(&config).unwrap();
        let mut out = Vec::new();
        let status = executor.report(&config.locator, &mut out).await.unwrap();
        (status, out)
    }

    #[tokio::test]
    async fn test_exit_status_success() {
        let file = feed_file(
            br#"<feed><entry><title>A</title><link rel="alternate" href="http://x/a"/></entry></feed>"#,
        );
        let (status, out) = report(file.path().to_str().unwrap()).await;
        assert_eq!(status, EXIT_OK);
        assert!(!out.is_empty());
    }

    #[tokio::test]
    async fn test_exit_status_zero_results() {
        let file = feed_file(b"<feed><entry><title>No link</title></entry></feed>");
        let (status, out) = report(file.path().to_str().unwrap()).await;
        assert_eq!(status, EXIT_OK);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_exit_status_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xml");
        let (status, out) = report(path.to_str().unwrap()).await;
        assert_eq!(status, EXIT_OK);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_exit_status_unreachable_url() {
        let (status, out) = report("http://127.0.0.1:1/atom").await;
        assert_eq!(status, EXIT_OK);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_exit_status_malformed_document() {
        let file = feed_file(b"<feed><entry></feed>");
        let (status, out) = report(file.path().to_str().unwrap()).await;
        assert_eq!(status, EXIT_PARSE_FAILURE);
        assert!(out.is_empty());
    }

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(exit_status(&Ok(FeedRun::empty())), EXIT_OK);
        assert_eq!(
            exit_status(&Err(ParseError::MissingRoot)),
            EXIT_PARSE_FAILURE
        );
    }

    #[tokio::test]
    async fn test_parse_error_is_returned() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"<feed><entry>").unwrap();

        let config = Config::new(file.path().to_str(), 10);
        let executor = FeedExecutor::from_config(&config).unwrap();
        let err = executor.run(&config.locator).await.unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnclosedElement(_) | ParseError::Xml(_)
        ));
    }
}
