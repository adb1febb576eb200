//! Best-effort reclamation of derivative files.

use folio_core::{DerivativeSet, VariantLabel};
use folio_storage::{Storage, StorageError};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Deletions in flight at once.
const RECLAIM_CONCURRENCY: usize = 16;

/// What to reclaim.
#[derive(Debug, Clone)]
pub enum ReclaimTarget {
    Set(DerivativeSet),
    Paths(Vec<String>),
    /// Untyped label → path map, as read back from a loosely typed store.
    Labeled(BTreeMap<String, String>),
}

impl From<DerivativeSet> for ReclaimTarget {
    fn from(set: DerivativeSet) -> Self {
        ReclaimTarget::Set(set)
    }
}

impl From<Vec<String>> for ReclaimTarget {
    fn from(paths: Vec<String>) -> Self {
        ReclaimTarget::Paths(paths)
    }
}

impl From<BTreeMap<String, String>> for ReclaimTarget {
    fn from(map: BTreeMap<String, String>) -> Self {
        ReclaimTarget::Labeled(map)
    }
}

/// Tally of one reclamation call.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReclaimSummary {
    pub deleted: usize,
    pub already_absent: usize,
    pub failed: usize,
    /// Unsafe paths and unknown labels that were never attempted.
    pub rejected: usize,
}

#[derive(Clone)]
pub struct ReclamationService {
    storage: Arc<dyn Storage>,
}

impl ReclamationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Delete every referenced file. Never fails; problems are logged and counted.
    pub async fn reclaim(&self, target: impl Into<ReclaimTarget>) -> ReclaimSummary {
        let mut summary = ReclaimSummary::default();

        let paths = match target.into() {
            ReclaimTarget::Set(set) => set.into_map().into_values().collect(),
            ReclaimTarget::Paths(paths) => paths,
            ReclaimTarget::Labeled(map) => Self::known_label_paths(map, &mut summary),
        };

        let storage = &self.storage;
        let outcomes: Vec<(String, Result<bool, StorageError>)> = stream::iter(paths)
            .map(|path| async move {
                let outcome = storage.delete(&path).await;
                (path, outcome)
            })
            .buffer_unordered(RECLAIM_CONCURRENCY)
            .collect()
            .await;

        for (path, outcome) in outcomes {
            match outcome {
                Ok(true) => summary.deleted += 1,
                Ok(false) => summary.already_absent += 1,
                Err(StorageError::InvalidKey(reason)) => {
                    tracing::warn!(storage_key = %path, reason = %reason, "Refusing to reclaim unsafe path");
                    summary.rejected += 1;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        storage_key = %path,
                        "Failed to reclaim derivative"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::debug!(
            deleted = summary.deleted,
            already_absent = summary.already_absent,
            failed = summary.failed,
            rejected = summary.rejected,
            "Reclamation finished"
        );
        summary
    }

    /// Keep paths under the five known labels; log anything else.
    fn known_label_paths(
        map: BTreeMap<String, String>,
        summary: &mut ReclaimSummary,
    ) -> Vec<String> {
        match DerivativeSet::try_from(map.clone()) {
            Ok(set) => set.into_map().into_values().collect(),
            Err(invalid) => {
                if !invalid.missing.is_empty() {
                    tracing::warn!(missing = ?invalid.missing, "Derivative map is missing labels");
                }
                if !invalid.unknown.is_empty() {
                    tracing::warn!(unknown = ?invalid.unknown, "Skipping unknown derivative labels");
                    summary.rejected += invalid.unknown.len();
                }
                map.into_iter()
                    .filter(|(label, _)| VariantLabel::parse(label).is_some())
                    .map(|(_, path)| path)
                    .collect()
            }
        }
    }
}
