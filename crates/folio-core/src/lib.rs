//! Folio Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration
//! shared by the storage and processing crates of the photo ingestion pipeline.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{OverflowPolicy, PipelineConfig};
pub use error::{ErrorMetadata, LogLevel, MediaError, MediaResult};
pub use models::{
    CandidateSource, DerivativeSet, ImageType, OutputFormat, ProcessedItemResult,
    UploadCandidate, VariantLabel,
};
