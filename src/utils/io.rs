//! IO Utilities for file access checks and in-place replacement

use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

/// Checks that `path` is an existing, readable regular file no larger than
/// `max_size`. Returns the file size.
#[instrument(level = "debug")]
pub fn ensure_readable(path: &Path, max_size: u64) -> Result<u64> {
    let metadata = fs::metadata(path)
        .map_err(|e| Error::FileAccess(format!("{}: {}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(Error::FileAccess(format!("{} is not a regular file", path.display())));
    }
    if metadata.len() > max_size {
        return Err(Error::FileAccess(format!(
            "{} is {} bytes, limit is {}",
            path.display(),
            metadata.len(),
            max_size
        )));
    }
    File::open(path).map_err(|e| Error::FileAccess(format!("{}: {}", path.display(), e)))?;
    Ok(metadata.len())
}

/// Checks that `path` can be opened for writing without modifying it.
pub fn ensure_writable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)?;
    if metadata.permissions().readonly() {
        return Err(Error::FileAccess(format!("{} is read-only", path.display())));
    }
    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| Error::FileAccess(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Reads the entire contents of a file into a byte vector.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Reads at most `limit` leading bytes of a file.
pub fn read_head(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buffer = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Replaces the content of `path` with `data`.
///
/// The data goes to a sibling temporary file which is then renamed over the
/// target, so the target holds either the old or the new bytes, never a mix.
#[instrument(level = "debug", skip(data), fields(len = data.len()))]
pub fn replace_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.as_file_mut().write_all(data)?;
    temp.as_file_mut().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|e| Error::IoError(e.error))?;

    debug!("Replaced {} ({} bytes)", path.display(), data.len());
    Ok(())
}

/// Removes a rejected file; if removal fails its content is overwritten
/// with a single `-` so the payload does not stay on disk.
pub fn safely_remove(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() == std::io::ErrorKind::NotFound {
            return;
        }
        warn!("Cannot remove {}: {}, overwriting content", path.display(), e);
        if let Err(e) = fs::write(path, b"-") {
            warn!("Cannot safely remove file {}: {}", path.display(), e);
        }
    }
}
