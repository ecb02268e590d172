use crate::error::BootstrapError;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOutcome {
    Created,
    Existing,
}

/// Make sure `path` is a usable directory, creating missing segments.
///
/// Permissions of an existing directory are never changed.
pub async fn ensure_dir(path: &Path) -> Result<DirOutcome, BootstrapError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => {
            check_writable(path).await?;
            Ok(DirOutcome::Existing)
        }
        Ok(_) => Err(BootstrapError::PathCollision {
            path: path.to_path_buf(),
        }),
        // a parent segment is a regular file
        Err(e) if e.kind() == ErrorKind::NotADirectory => Err(BootstrapError::PathCollision {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(path)
                .await
                .map_err(|source| BootstrapError::DirCreate {
                    path: path.to_path_buf(),
                    source,
                })?;
            check_writable(path).await?;
            Ok(DirOutcome::Created)
        }
        Err(source) => Err(BootstrapError::DirInspect {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writable means the current user can create (and remove) a scratch file in it.
async fn check_writable(path: &Path) -> Result<(), BootstrapError> {
    let dir = path.to_path_buf();
    let checked = tokio::task::spawn_blocking(move || {
        let scratch = tempfile::Builder::new()
            .prefix(".write-check")
            .tempfile_in(&dir)?;
        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(path = %scratch_path.display(), error = %e, "failed to remove write check file");
        }
        Ok::<(), std::io::Error>(())
    })
    .await
    .map_err(|e| BootstrapError::DirInspect {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;

    checked.map_err(|source| BootstrapError::NotWritable {
        path: path.to_path_buf(),
        source,
    })
}
