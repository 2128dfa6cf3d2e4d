//! Atomic artifact writes: bytes land in a temporary file beside the target
//! and are renamed into place only when complete.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::EmissionError;

pub async fn write_atomic(
    path: &Path,
    bytes: Vec<u8>,
    cancel: &CancellationToken,
) -> Result<(), EmissionError> {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| EmissionError::io(&dir, &e))?;

    let target = path.to_path_buf();
    let cancel = cancel.clone();
    tokio::task::spawn_blocking(move || persist(&dir, &target, &bytes, &cancel))
        .await
        .map_err(|e| EmissionError::Render(format!("write task failed: {e}")))?
}

fn persist(
    dir: &Path,
    target: &Path,
    bytes: &[u8],
    cancel: &CancellationToken,
) -> Result<(), EmissionError> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| EmissionError::io(dir, &e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| EmissionError::io(tmp.path(), &e))?;

    // Dropping the temp file removes it.
    if cancel.is_cancelled() {
        return Err(EmissionError::Cancelled);
    }

    tmp.persist(target)
        .map_err(|e| EmissionError::io(target, &e.error))?;
    debug!(path = %target.display(), bytes = bytes.len(), "Artifact written");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
