//! Batch ingestion: intake → place → render, one candidate at a time (or a
//! bounded number concurrently), results index-aligned with the input.

use folio_core::{
    CandidateSource, ErrorMetadata, LogLevel, MediaError, MediaResult, PipelineConfig,
    ProcessedItemResult, UploadCandidate,
};
use folio_storage::{storage_key, LocalStorage, Storage, StorageError};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;

use super::types::{CandidateResult, StoredOriginal};
use crate::naming::{new_identifier, stored_original_filename};
use crate::reclaim::{ReclaimSummary, ReclaimTarget, ReclamationService};
use crate::renderer::DerivativeRenderer;
use crate::validator::IntakeFilter;

/// The ingestion pipeline.
///
/// Cheap to clone; every clone shares the same storage backend.
#[derive(Clone)]
pub struct UploadPipeline {
    config: Arc<PipelineConfig>,
    storage: Arc<dyn Storage>,
    intake: IntakeFilter,
    renderer: DerivativeRenderer,
    reclaimer: ReclamationService,
}

impl UploadPipeline {
    pub fn new(config: PipelineConfig, storage: Arc<dyn Storage>) -> Self {
        let intake = IntakeFilter::new(&config);
        let renderer = DerivativeRenderer::new(
            storage.clone(),
            config.output_format,
            config.resize_quality,
            config.original_quality,
        );
        let reclaimer = ReclamationService::new(storage.clone());

        Self {
            config: Arc::new(config),
            storage,
            intake,
            renderer,
            reclaimer,
        }
    }

    /// Pipeline over local disk rooted at `config.storage_root`.
    pub fn local(config: PipelineConfig) -> Self {
        let storage = Arc::new(LocalStorage::new(config.storage_root.clone()));
        Self::new(config, storage)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Make sure the category's directory exists. Failure means nothing can
    /// be stored for this category.
    pub async fn ensure_storage_ready(&self, category: &str) -> MediaResult<()> {
        self.storage.ensure_category(category).await.map_err(|e| {
            tracing::error!(error = %e, category = %category, "Storage root unavailable");
            MediaError::FatalStorage(e.to_string())
        })
    }

    /// Ingest a batch of candidates into `category`.
    ///
    /// Returns `Err` only when the batch as a whole cannot proceed: too many
    /// files under the reject policy, or an unusable storage root. Otherwise
    /// every candidate gets its own result, in input order.
    #[tracing::instrument(skip(self, candidates), fields(batch_size = candidates.len()))]
    pub async fn process_uploads(
        &self,
        category: &str,
        candidates: Vec<UploadCandidate>,
    ) -> MediaResult<Vec<CandidateResult>> {
        let started = Instant::now();
        let total = candidates.len();
        let admitted = self.intake.admit_batch(total)?;
        if admitted < total {
            tracing::info!(admitted, total, "Truncating oversized batch");
        }

        self.ensure_storage_ready(category).await?;

        let deadline = self.config.batch_deadline.map(|budget| started + budget);
        let halted = Arc::new(AtomicBool::new(false));

        let results: Vec<CandidateResult> = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| {
                let halted = halted.clone();
                async move {
                    if index >= admitted {
                        return Err(self.intake.too_many(total));
                    }
                    if halted.load(Ordering::SeqCst) {
                        return Err(MediaError::NotProcessed {
                            filename: candidate.original_filename,
                            reason: "batch halted after an earlier failure".to_string(),
                        });
                    }
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        return Err(MediaError::NotProcessed {
                            filename: candidate.original_filename,
                            reason: "batch deadline exceeded".to_string(),
                        });
                    }

                    let result = self.spawn_candidate(category, candidate).await;
                    if let Err(e) = &result {
                        if self.config.fail_fast || matches!(e, MediaError::FatalStorage(_)) {
                            halted.store(true, Ordering::SeqCst);
                        }
                    }
                    result
                }
            })
            .buffered(self.config.max_concurrent_candidates.max(1))
            .collect()
            .await;

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!(
            accepted,
            rejected = total - accepted,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Batch processed"
        );

        Ok(results)
    }

    /// Best-effort deletion of previously returned derivatives. Never fails.
    pub async fn reclaim(&self, target: impl Into<ReclaimTarget>) -> ReclaimSummary {
        self.reclaimer.reclaim(target).await
    }

    /// Run one candidate on its own task so it always finishes once started,
    /// even if the caller stops waiting.
    async fn spawn_candidate(&self, category: &str, candidate: UploadCandidate) -> CandidateResult {
        let filename = candidate.original_filename.clone();
        let pipeline = self.clone();
        let category = category.to_string();

        let result = tokio::spawn(async move {
            pipeline.process_candidate(&category, candidate).await
        })
        .await
        .unwrap_or_else(|e| {
            Err(MediaError::Internal(format!(
                "candidate task for {} failed: {}",
                filename, e
            )))
        });

        if let Err(e) = &result {
            log_rejection(e);
        }
        result
    }

    async fn process_candidate(
        &self,
        category: &str,
        candidate: UploadCandidate,
    ) -> CandidateResult {
        let image_type = self.intake.check(&candidate)?;

        // Declared sizes come from the client; measure what actually arrived.
        let size_bytes = match &candidate.source {
            CandidateSource::InMemory(data) => data.len() as u64,
            CandidateSource::Staged(path) => fs::metadata(path)
                .await
                .map_err(|e| MediaError::ImageProcessingFailed {
                    filename: candidate.original_filename.clone(),
                    reason: format!("staged upload unavailable: {}", e),
                })?
                .len(),
        };
        self.intake
            .check_size(&candidate.original_filename, size_bytes)?;

        let identifier = new_identifier();
        let extension = image_type.extension_for(&candidate.original_filename);
        let key = storage_key(
            category,
            &stored_original_filename(identifier, extension),
        );

        let placed = match candidate.source {
            CandidateSource::Staged(path) => self.storage.import(&path, &key).await,
            CandidateSource::InMemory(data) => self.storage.write(&key, data.to_vec()).await,
        };
        let size_bytes = placed.map_err(|e| match e {
            StorageError::NotFound(_) => MediaError::ImageProcessingFailed {
                filename: candidate.original_filename.clone(),
                reason: format!("staged upload disappeared: {}", e),
            },
            other => MediaError::FatalStorage(other.to_string()),
        })?;

        tracing::debug!(
            identifier = %identifier,
            storage_key = %key,
            size_bytes,
            "Placed stored original"
        );

        let original = StoredOriginal {
            identifier,
            storage_key: key,
            size_bytes,
        };
        let rendered = self
            .renderer
            .render(category, &original, &candidate.original_filename)
            .await?;

        Ok(ProcessedItemResult {
            original_filename: candidate.original_filename,
            identifier,
            derivatives: rendered.derivatives,
            size_bytes: original.size_bytes,
            width: rendered.width,
            height: rendered.height,
        })
    }
}

fn log_rejection(e: &MediaError) {
    match e.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %e, error_code = e.error_code(), "Candidate rejected")
        }
        LogLevel::Warn => {
            tracing::warn!(error = %e, error_code = e.error_code(), "Candidate failed")
        }
        LogLevel::Error => {
            tracing::error!(error = %e, error_code = e.error_code(), "Candidate failed")
        }
    }
}
