use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::derivative::DerivativeSet;

/// Where an in-flight candidate's bytes currently live.
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// Materialized on disk by the transport layer. The file is moved into the
    /// storage root once the candidate is accepted.
    Staged(PathBuf),
    /// Fully buffered in memory.
    InMemory(Bytes),
}

/// One uploaded file part, before acceptance.
///
/// `original_filename` is untrusted and display-only; it never contributes to
/// an on-disk path.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub original_filename: String,
    pub content_type: String,
    pub declared_size: u64,
    pub source: CandidateSource,
}

impl UploadCandidate {
    pub fn staged(
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
        declared_size: u64,
        staging_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type: content_type.into(),
            declared_size,
            source: CandidateSource::Staged(staging_path.into()),
        }
    }

    pub fn in_memory(
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            original_filename: original_filename.into(),
            content_type: content_type.into(),
            declared_size: data.len() as u64,
            source: CandidateSource::InMemory(data),
        }
    }
}

/// Per-candidate record handed back to the caller for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedItemResult {
    pub original_filename: String,
    /// Generated filename stem shared by every derivative.
    pub identifier: Uuid,
    pub derivatives: DerivativeSet,
    /// Byte size of the upload as received.
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
}
