pub mod config;
pub mod executor;
pub mod feed;
pub mod model;
pub mod report;
pub mod traits;

// Re-export common types for convenience
pub use config::*;
pub use executor::*;
pub use feed::{FeedRun, FeedStats, Locator, LocatorLoader, PipelineError, SkippedEntry};
pub use model::*;
pub use report::*;
pub use traits::*;
