use crate::keys::{validate_category, validate_key};
use crate::root::ensure_dir;
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path`.
    ///
    /// Nothing is touched on disk until a category is ensured.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStorage {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    pub fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.base_path.join(storage_key))
    }

    /// Hidden sibling used while a file is being written.
    fn temp_path_for(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent).await?;
        }
        Ok(())
    }

    async fn write_temp(temp_path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }

    /// Copy `source` next to `path`, then rename it into place.
    async fn copy_into_place(source: &Path, path: &Path) -> StorageResult<()> {
        let temp_path = Self::temp_path_for(path);

        let copied = async {
            fs::copy(source, &temp_path).await?;
            fs::File::open(&temp_path).await?.sync_all().await?;
            fs::rename(&temp_path, path).await
        }
        .await;

        if let Err(e) = copied {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                path.display(),
                e
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn ensure_category(&self, category: &str) -> StorageResult<()> {
        validate_category(category)?;
        ensure_dir(&self.base_path.join(category)).await
    }

    async fn write(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = Instant::now();
        let temp_path = Self::temp_path_for(&path);

        if let Err(e) = Self::write_temp(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            tracing::warn!(
                from = %temp_path.display(),
                to = %path.display(),
                error = %e,
                "Local storage rename failed"
            );
            return Err(StorageError::WriteFailed(format!(
                "Failed to move file into place {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(size)
    }

    async fn import(&self, source: &Path, storage_key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        let start = Instant::now();

        let size = match fs::metadata(source).await {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => {
                return Err(StorageError::ReadFailed(format!(
                    "{} is not a regular file",
                    source.display()
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(source.display().to_string()))
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to stat {}: {}",
                    source.display(),
                    e
                )))
            }
        };

        self.ensure_parent_dir(&path).await?;

        if let Err(e) = fs::rename(source, &path).await {
            // Staging areas often sit on a different filesystem.
            tracing::debug!(
                source = %source.display(),
                error = %e,
                "Rename failed, falling back to copy"
            );
            Self::copy_into_place(source, &path).await?;

            if let Err(e) = fs::remove_file(source).await {
                tracing::warn!(
                    source = %source.display(),
                    error = %e,
                    "Failed to remove staging file after copy"
                );
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage import successful"
        );

        Ok(size)
    }

    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = Instant::now();

        let data = fs::read(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(storage_key.to_string()),
            _ => StorageError::ReadFailed(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            )),
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage read successful"
        );

        Ok(data)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        let start = Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(key = %storage_key, "Local storage delete: already absent");
                Ok(false)
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        fs::try_exists(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to stat {}: {}", storage_key, e))
        })
    }
}
