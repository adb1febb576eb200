use async_trait::async_trait;
use folio_storage::{LocalStorage, Storage, StorageError, StorageResult};
use std::path::Path;

/// Local storage that refuses writes to keys ending in `suffix`.
/// Imports are refused too when `fail_imports` is set.
#[derive(Clone)]
pub struct FlakyStorage {
    pub inner: LocalStorage,
    pub suffix: String,
    pub fail_imports: bool,
}

impl FlakyStorage {
    pub fn failing_writes(inner: LocalStorage, suffix: &str) -> Self {
        Self {
            inner,
            suffix: suffix.to_string(),
            fail_imports: false,
        }
    }

    pub fn failing_imports(inner: LocalStorage) -> Self {
        Self {
            inner,
            suffix: String::new(),
            fail_imports: true,
        }
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn ensure_category(&self, category: &str) -> StorageResult<()> {
        self.inner.ensure_category(category).await
    }

    async fn write(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<u64> {
        if !self.suffix.is_empty() && storage_key.ends_with(&self.suffix) {
            return Err(StorageError::WriteFailed(format!(
                "injected failure for {}",
                storage_key
            )));
        }
        self.inner.write(storage_key, data).await
    }

    async fn import(&self, source: &Path, storage_key: &str) -> StorageResult<u64> {
        if self.fail_imports {
            return Err(StorageError::WriteFailed(format!(
                "injected failure importing {}",
                storage_key
            )));
        }
        self.inner.import(source, storage_key).await
    }

    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.delete(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }
}
