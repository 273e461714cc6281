//! Feed pipeline executor.
//!
//! This module provides the [`FeedPipeline`] coordinator that executes the
//! sequential feed stages (Load → Parse → Extract → Validate) with:
//! - Async loading via a pluggable [`SourceLoader`]
//! - XML parsing and extraction on a blocking worker thread
//! - Per-entry skip policy: one bad entry never aborts the run
//! - Structured logging via `tracing`

use std::time::Instant;
use tracing::{info, warn};

use crate::feed::document::parse_document;
use crate::feed::extract::{extract_entry, find_entries};
use crate::feed::loader::Locator;
use crate::model::{Publication, RawEntry};
use crate::traits::{EntryError, FetchError, ParseError, SourceLoader};

// ============================================================================
// Pipeline Types
// ============================================================================

/// An entry that did not make it into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Zero-based position among the document's `<entry>` elements
    pub position: usize,

    pub reason: EntryError,
}

/// Result of one pipeline run.
#[derive(Debug, Default)]
pub struct FeedRun {
    /// Accepted publications in document order
    pub publications: Vec<Publication>,

    pub skipped: Vec<SkippedEntry>,

    pub stats: FeedStats,
}

impl FeedRun {
    /// A run that produced nothing, e.g. after a fetch error.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Statistics about the run.
#[derive(Debug, Default, Clone)]
pub struct FeedStats {
    /// Total time spent on the run (milliseconds)
    pub total_duration_ms: u64,

    /// Time spent loading the document (milliseconds)
    pub load_duration_ms: u64,

    /// Time spent parsing and extracting (milliseconds)
    pub parse_duration_ms: u64,

    /// Size of the loaded document
    pub bytes_loaded: usize,

    /// Number of `<entry>` elements found
    pub entries_found: usize,

    /// Number of entries accepted as publications
    pub publications: usize,

    /// Number of entries skipped
    pub entries_skipped: usize,
}

// ============================================================================
// Pipeline Errors
// ============================================================================

/// Errors that abort a pipeline run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse failed: {0}")]
    Parse(#[from] ParseError),
}

// ============================================================================
// Pipeline Executor
// ============================================================================

/// Sequential feed pipeline.
///
/// 1. **Load**: resolve the locator to bytes with the configured loader
/// 2. **Parse**: build the element tree and find every `<entry>`
/// 3. **Extract**: pull title, alternate link and summary per entry
/// 4. **Validate**: build a [`Publication`] or skip the entry
///
/// # Example
///
/// ```ignore
/// use atom_publications::feed::{FeedPipeline, Locator, LocatorLoader};
/// use std::time::Duration;
///
/// let pipeline = FeedPipeline::new(LocatorLoader::new(Duration::from_secs(10))?);
/// let run = pipeline.execute(&Locator::parse("feed.xml")).await?;
/// println!("{} publications", run.publications.len());
/// ```
pub struct FeedPipeline<L>
where
    L: SourceLoader,
{
    loader: L,
}

impl<L> FeedPipeline<L>
where
    L: SourceLoader,
{
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Runs every stage for one locator.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Fetch`] if the document cannot be loaded and
    /// [`PipelineError::Parse`] if it is not well-formed XML. Invalid entries
    /// are not errors; they are listed in [`FeedRun::skipped`].
    pub async fn execute(&self, locator: &Locator) -> Result<FeedRun, PipelineError> {
        let start = Instant::now();
        let mut stats = FeedStats::default();

        // ====================================================================
        // Stage 1: Load
        // ====================================================================

        let load_start = Instant::now();
        let bytes = self.loader.load(locator).await?;
        stats.load_duration_ms = load_start.elapsed().as_millis() as u64;
        stats.bytes_loaded = bytes.len();

        // ====================================================================
        // Stage 2 + 3: Parse and extract
        // ====================================================================

        info!(bytes = stats.bytes_loaded, "Parsing feed document");
        let parse_start = Instant::now();

        let extracted = tokio::task::spawn_blocking(move || parse_entries(&bytes))
            .await
            .map_err(|e| ParseError::Task(e.to_string()))??;

        stats.parse_duration_ms = parse_start.elapsed().as_millis() as u64;
        stats.entries_found = extracted.len();

        // ====================================================================
        // Stage 4: Validate
        // ====================================================================

        let mut run = FeedRun::default();
        for entry in extracted {
            match entry.and_then(validate) {
                Ok(publication) => run.publications.push(publication),
                Err(skipped) => {
                    warn!(
                        entry = skipped.position,
                        reason = %skipped.reason,
                        "Skipping entry"
                    );
                    run.skipped.push(skipped);
                }
            }
        }

        stats.publications = run.publications.len();
        stats.entries_skipped = run.skipped.len();
        stats.total_duration_ms = start.elapsed().as_millis() as u64;

        info!(
            entries = stats.entries_found,
            publications = stats.publications,
            skipped = stats.entries_skipped,
            duration_ms = stats.parse_duration_ms,
            "Parsing completed"
        );

        run.stats = stats;
        Ok(run)
    }
}

fn parse_entries(bytes: &[u8]) -> Result<Vec<Result<RawEntry, SkippedEntry>>, ParseError> {
    let root = parse_document(bytes)?;
    Ok(find_entries(&root)
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            extract_entry(position, entry).map_err(|reason| SkippedEntry { position, reason })
        })
        .collect())
}

fn validate(raw: RawEntry) -> Result<Publication, SkippedEntry> {
    let position = raw.position;
    Publication::try_from(raw).map_err(|reason| SkippedEntry { position, reason })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SUMMARY_PLACEHOLDER;
    use async_trait::async_trait;
    use std::path::PathBuf;

    // In-memory loader for testing
    struct StaticLoader(&'static str);

    #[async_trait]
    impl SourceLoader for StaticLoader {
        fn loader_name(&self) -> &'static str {
            "static"
        }

        async fn load(&self, _locator: &Locator) -> Result<Vec<u8>, FetchError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    // Loader that always fails like a missing file
    struct FailingLoader;

    #[async_trait]
    impl SourceLoader for FailingLoader {
        fn loader_name(&self) -> &'static str {
            "failing"
        }

        async fn load(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Io {
                path: PathBuf::from(locator.to_string()),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    const MIXED_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Feed title is not an entry</title>
  <entry>
    <title>First</title>
    <link rel="alternate" href="http://x/1"/>
    <summary>one</summary>
  </entry>
  <entry>
    <link rel="alternate" href="http://x/2"/>
    <summary>no title</summary>
  </entry>
  <entry>
    <title>Third</title>
    <link rel="alternate"/>
    <summary>no href</summary>
  </entry>
  <entry>
    <title>Fourth</title>
    <link rel="self" href="http://x/4/self"/>
  </entry>
  <entry>
    <title>Fifth</title>
    <link rel="alternate" href="http://x/5"/>
  </entry>
</feed>"#;

    fn locator() -> Locator {
        Locator::parse("feed.xml")
    }

    #[tokio::test]
    async fn test_pipeline_skips_invalid_entries() {
        let pipeline = FeedPipeline::new(StaticLoader(MIXED_FEED));
        let run = pipeline.execute(&locator()).await.unwrap();

        let titles: Vec<&str> = run.publications.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Fifth"]);
        assert_eq!(run.publications[1].summary, SUMMARY_PLACEHOLDER);

        assert_eq!(
            run.skipped,
            vec![
                SkippedEntry { position: 1, reason: EntryError::MissingTitle },
                SkippedEntry { position: 2, reason: EntryError::MissingHref },
                SkippedEntry { position: 3, reason: EntryError::MissingAlternateLink },
            ]
        );
    }

    #[tokio::test]
    async fn test_pipeline_stats() {
        let pipeline = FeedPipeline::new(StaticLoader(MIXED_FEED));
        let run = pipeline.execute(&locator()).await.unwrap();

        assert_eq!(run.stats.bytes_loaded, MIXED_FEED.len());
        assert_eq!(run.stats.entries_found, 5);
        assert_eq!(run.stats.publications, 2);
        assert_eq!(run.stats.entries_skipped, 3);
        assert!(run.stats.publications <= run.stats.entries_found);
    }

    #[tokio::test]
    async fn test_pipeline_blank_title_is_skipped() {
        let feed = r#"<feed><entry><title>   </title><link rel="alternate" href="http://x/a"/></entry></feed>"#;
        let run = FeedPipeline::new(StaticLoader(feed))
            .execute(&locator())
            .await
            .unwrap();

        assert!(run.publications.is_empty());
        assert_eq!(run.skipped[0].reason, EntryError::EmptyTitle);
    }

    #[tokio::test]
    async fn test_pipeline_feed_without_entries() {
        let run = FeedPipeline::new(StaticLoader("<feed><title>Empty</title></feed>"))
            .execute(&locator())
            .await
            .unwrap();

        assert!(run.publications.is_empty());
        assert!(run.skipped.is_empty());
        assert_eq!(run.stats.entries_found, 0);
    }

    #[tokio::test]
    async fn test_pipeline_fetch_error() {
        let err = FeedPipeline::new(FailingLoader)
            .execute(&locator())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(FetchError::Io { .. })));
    }

    #[tokio::test]
    async fn test_pipeline_malformed_document() {
        let err = FeedPipeline::new(StaticLoader("<feed><entry></feed>"))
            .execute(&locator())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }
}
