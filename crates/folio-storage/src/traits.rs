//! Storage abstraction trait
//!
//! This module defines the Storage trait the ingestion pipeline writes through.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage root unusable: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Keys are relative to the storage root: `{category}/{filename}`. See the
/// crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Make sure the directory backing `category` exists and is a directory.
    ///
    /// Idempotent and safe to call concurrently for the same category.
    async fn ensure_category(&self, category: &str) -> StorageResult<()>;

    /// Durably write `data` at `storage_key`.
    ///
    /// The file appears under its final name only once fully written; a
    /// failed write leaves nothing behind. Returns the number of bytes written.
    async fn write(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<u64>;

    /// Move a file materialized elsewhere on disk to `storage_key`.
    ///
    /// The source no longer exists afterwards. Returns the file size.
    async fn import(&self, source: &Path, storage_key: &str) -> StorageResult<u64>;

    /// Read a file by its storage key
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key.
    ///
    /// Returns `false` when the file was already absent; that is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<bool>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
