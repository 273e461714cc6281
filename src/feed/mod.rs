//! Feed module - Atom document loading, parsing and entry extraction.
//!
//! - **Loader**: [`Locator`] resolution and [`LocatorLoader`] (HTTP or file)
//! - **Document**: `quick-xml` backed element tree queried by local name
//! - **Extract**: per-entry title / alternate link / summary extraction
//! - **Pipeline**: async executor via [`pipeline::FeedPipeline`]

pub mod document;
pub mod extract;
pub mod loader;
pub mod pipeline;

// Re-export commonly used types
pub use document::{parse_document, Element, Node};
pub use extract::{extract_entry, find_entries};
pub use loader::{FileLoader, HttpLoader, Locator, LocatorLoader};
pub use pipeline::{FeedPipeline, FeedRun, FeedStats, PipelineError, SkippedEntry};
