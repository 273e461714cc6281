use serde::{Deserialize, Serialize};

use crate::traits::EntryError;

/// Summary text used when an entry carries no `<summary>` element.
pub const SUMMARY_PLACEHOLDER: &str = "No text available.";

/// A validated feed entry. Field order here is the JSON key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub link: String,
    pub summary: String,
}

/// Fields pulled out of one `<entry>` before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub position: usize, // zero-based, document order
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
}

impl TryFrom<RawEntry> for Publication {
    type Error = EntryError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let title = raw.title.ok_or(EntryError::MissingTitle)?;
        if title.trim().is_empty() {
            return Err(EntryError::EmptyTitle);
        }
        let link = raw.link.ok_or(EntryError::MissingHref)?;

        Ok(Publication {
            title,
            link,
            summary: raw
                .summary
                .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string()),
        })
    }
}
