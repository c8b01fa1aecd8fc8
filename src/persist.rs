//! Whole-file writes: content lands in a temp file beside the target and is renamed
//! into place, so a killed process never leaves a half-written output behind.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

fn stage(path: &Path, contents: &[u8]) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Writes `contents` to `path`, replacing any existing file.
pub fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    let tmp = stage(path, contents.as_ref())?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Writes `contents` to `path`; fails with `AlreadyExists` if `path` is already there.
pub fn write_new_atomic(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    let tmp = stage(path, contents.as_ref())?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "Wrote new file");
    Ok(())
}
