//! Types for the upload pipeline.

use folio_core::{MediaResult, ProcessedItemResult};
use uuid::Uuid;

/// Raw upload bytes placed under the storage root, awaiting rendering.
///
/// Safe to delete whenever no derivative set refers to its identifier.
#[derive(Clone, Debug)]
pub struct StoredOriginal {
    pub identifier: Uuid,
    pub storage_key: String,
    pub size_bytes: u64,
}

/// Outcome for one candidate, index-aligned with the submitted batch.
pub type CandidateResult = MediaResult<ProcessedItemResult>;
