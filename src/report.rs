use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::Write;
use thiserror::Error;

use crate::model::Publication;

const INDENT: &[u8] = b"    ";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize publications: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes publications as an indented JSON array followed by a newline.
///
/// Non-ASCII text is written as UTF-8, not `\u` escaped. Nothing is written
/// for an empty slice.
pub fn write_publications<W: Write>(
    mut writer: W,
    publications: &[Publication],
) -> Result<(), ReportError> {
    if publications.is_empty() {
        return Ok(());
    }

    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
    publications.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
