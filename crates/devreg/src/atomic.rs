//! Replace-on-write helpers for the two local state files.

use devreg_core::{DevRegError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Sibling temp path in the same directory, so the final rename cannot
/// cross filesystems
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with `contents`.
///
/// The data is synced to disk before the rename and the parent directory is
/// synced after it; a failure at any step is returned, never swallowed.
/// `mode` sets unix permissions on the temp file as it is created, so the
/// contents are never readable with looser permissions. The temp file is
/// removed if the write does not complete.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8], mode: Option<u32>) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DevRegError::io(dir, e))?;
    }

    // A leftover temp file keeps its old mode when reopened; start fresh.
    let tmp = temp_path(path);
    remove_if_exists(&tmp).await?;

    if let Err(e) = write_and_replace(&tmp, path, contents, mode).await {
        if let Err(cleanup) = remove_if_exists(&tmp).await {
            warn!(path = %tmp.display(), error = %cleanup, "could not remove temp file");
        }
        return Err(e);
    }

    #[cfg(unix)]
    if let Some(dir) = parent {
        let handle = tokio::fs::File::open(dir)
            .await
            .map_err(|e| DevRegError::io(dir, e))?;
        handle
            .sync_all()
            .await
            .map_err(|e| DevRegError::io(dir, e))?;
    }

    Ok(())
}

async fn write_and_replace(
    tmp: &Path,
    path: &Path,
    contents: &[u8],
    mode: Option<u32>,
) -> Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if let Some(mode) = mode {
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options
        .open(tmp)
        .await
        .map_err(|e| DevRegError::io(tmp, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| DevRegError::io(tmp, e))?;
    file.sync_all()
        .await
        .map_err(|e| DevRegError::io(tmp, e))?;
    drop(file);

    tokio::fs::rename(tmp, path)
        .await
        .map_err(|e| DevRegError::io(path, e))
}

/// Delete `path`, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub(crate) async fn remove_if_exists(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DevRegError::io(path, e)),
    }
}
