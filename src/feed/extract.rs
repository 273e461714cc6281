use crate::feed::document::Element;
use crate::model::RawEntry;
use crate::traits::EntryError;

const ALTERNATE: &str = "alternate";

/// Every `<entry>` element in the document, in document order.
pub fn find_entries(root: &Element) -> Vec<&Element> {
    let mut entries = Vec::new();
    if root.name == "entry" {
        entries.push(root);
    }
    entries.extend(root.find_all("entry"));
    entries
}

/// Pulls title, alternate link and summary out of one entry.
///
/// Missing title or link is reported here, before a
/// [`Publication`](crate::model::Publication) is attempted. A missing
/// summary is not an error; it is left as `None` and filled in during
/// validation.
pub fn extract_entry(position: usize, entry: &Element) -> Result<RawEntry, EntryError> {
    let title = entry
        .find("title")
        .map(|title| title.text().trim().to_string())
        .ok_or(EntryError::MissingTitle)?;

    let link = entry
        .find_all("link")
        .find(|link| link.attribute("rel") == Some(ALTERNATE))
        .ok_or(EntryError::MissingAlternateLink)?
        .attribute("href")
        .ok_or(EntryError::MissingHref)?
        .to_string();

    let summary = entry
        .find("summary")
        .map(|summary| summary.text().trim().to_string());

    Ok(RawEntry {
        position,
        title: Some(title),
        link: Some(link),
        summary,
    })
}
