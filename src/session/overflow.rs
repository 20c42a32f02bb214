//! Durable spill storage for timed-out session output.
//!
//! When a command times out the full buffered stdout/stderr can be far too
//! large to embed in an error message. The full streams are written to
//! persistent temp files for post-mortem inspection and only a truncated
//! preview travels inline.

use std::io::Write;
use std::path::PathBuf;

use crate::{AppError, Result};

/// Suffix appended to a preview that was cut at the byte limit.
const CLIPPED_MARKER: &str = "<response clipped>";

/// Persist `contents` to a uniquely named log file that survives process
/// exit, returning its path.
///
/// # Errors
///
/// Returns `AppError::Io` if the file cannot be created or written.
pub fn spill(prefix: &str, contents: &str) -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".log")
        .tempfile()
        .map_err(|err| AppError::Io(format!("failed to create spill file: {err}")))?;

    let (mut file, path) = file
        .keep()
        .map_err(|err| AppError::Io(format!("failed to persist spill file: {err}")))?;

    file.write_all(contents.as_bytes())
        .map_err(|err| AppError::Io(format!("failed to write spill file: {err}")))?;

    Ok(path)
}

/// Truncate `text` to at most `limit` bytes on a character boundary,
/// appending a clipped marker when anything was cut.
#[must_use]
pub fn truncate_preview(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_owned();
    }

    let mut cut = limit;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut preview = text[..cut].to_owned();
    preview.push_str(CLIPPED_MARKER);
    preview
}
