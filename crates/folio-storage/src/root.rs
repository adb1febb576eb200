//! Storage root bootstrap.

use std::io;
use std::path::Path;
use tokio::fs;

use crate::traits::{StorageError, StorageResult};

/// Make sure `path` exists as a directory, creating missing ancestors.
///
/// Concurrent callers racing on the same path all succeed: a create that
/// loses the race is re-checked and accepted as long as a directory is there.
pub async fn ensure_dir(path: &Path) -> StorageResult<()> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(StorageError::Config(format!(
                "{} exists and is not a directory",
                path.display()
            )))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(StorageError::Config(format!(
                "Failed to access storage directory {}: {}",
                path.display(),
                e
            )))
        }
    }

    match fs::create_dir_all(path).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Created storage directory");
            Ok(())
        }
        Err(e) => {
            if fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false) {
                tracing::debug!(path = %path.display(), "Storage directory created concurrently");
                return Ok(());
            }
            Err(StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                path.display(),
                e
            )))
        }
    }
}
