//! Clearing the query log
//!
//! The proxy keeps its log open in append mode, so the file is truncated in
//! place rather than removed and recreated. An `O_APPEND` writer keeps writing
//! at the new end of file after truncation. A line the proxy is appending at
//! the moment of truncation may survive or be lost; the two sides are not
//! coordinated.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use crate::error::{LogError, Result};

/// Truncate the log at `path` to zero length.
///
/// A missing file is already clear and is left missing.
pub fn clear_log(path: &Path) -> Result<()> {
    let truncate_err = |cause| LogError::Truncate {
        path: path.to_path_buf(),
        cause,
    };

    // No create/truncate flags: only an existing file is touched
    let file = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "query log absent, nothing to clear");
            return Ok(());
        }
        Err(e) => return Err(truncate_err(e)),
    };

    let previous_len = file.metadata().map(|m| m.len()).unwrap_or_default();
    file.set_len(0).map_err(truncate_err)?;

    tracing::info!(path = %path.display(), bytes = previous_len, "query log cleared");
    Ok(())
}
