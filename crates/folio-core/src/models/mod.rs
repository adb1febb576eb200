//! Data models for the ingestion pipeline

mod derivative;
mod media;
mod upload;

pub use derivative::{DerivativeSet, InvalidLabelSet};
pub use media::{ImageType, OutputFormat, VariantLabel};
pub use upload::{CandidateSource, ProcessedItemResult, UploadCandidate};
