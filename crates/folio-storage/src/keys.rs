//! Shared key rules for the storage layer.
//!
//! Key format: `{category}/{filename}`, one level deep, relative to the
//! storage root.

use crate::traits::{StorageError, StorageResult};

/// Build the storage key for `filename` under `category`.
pub fn storage_key(category: &str, filename: &str) -> String {
    format!("{}/{}", category, filename)
}

/// A category names one flat directory directly under the storage root.
pub fn validate_category(category: &str) -> StorageResult<()> {
    if category.is_empty()
        || category.starts_with('.')
        || category.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::InvalidKey(format!(
            "invalid category: {:?}",
            category
        )));
    }
    Ok(())
}

/// Reject keys that could resolve outside the storage root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty()
        || storage_key.starts_with('/')
        || storage_key.contains(['\\', '\0'])
        || storage_key.contains("..")
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }

    let all_normal = storage_key
        .split('/')
        .all(|segment| !segment.is_empty() && segment != ".");
    if !all_normal {
        return Err(StorageError::InvalidKey(
            "Storage key resolves outside storage directory".to_string(),
        ));
    }
    Ok(())
}
