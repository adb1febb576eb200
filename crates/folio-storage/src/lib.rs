//! Folio Storage Library
//!
//! This crate provides the storage abstraction for the photo ingestion
//! pipeline: the [`Storage`] trait, the filesystem backed [`LocalStorage`] and
//! the race-tolerant directory bootstrap used before any write.
//!
//! # Storage key format
//!
//! Every file lives flat under its upload category:
//!
//! - `{category}/{identifier}_{variant}.{ext}`
//!
//! Keys are relative to the storage root and must not contain `..` or a
//! leading `/`. Key construction and validation are centralized in the
//! [`keys`] module so the pipeline and the reclamation path agree on them.

pub mod keys;
pub mod local;
pub mod root;
pub mod traits;

// Re-export commonly used types
pub use keys::{storage_key, validate_category, validate_key};
pub use local::LocalStorage;
pub use root::ensure_dir;
pub use traits::{Storage, StorageError, StorageResult};
