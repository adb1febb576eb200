//! Derivative renderer
//!
//! Decodes one stored original, renders the four cover-fit presets plus a
//! full-size re-encode, writes all five, and only then deletes the original.
//! Any failure before that point leaves the original where it is.

use bytes::Bytes;
use folio_core::{DerivativeSet, MediaError, MediaResult, OutputFormat, VariantLabel};
use folio_storage::Storage;
use std::sync::Arc;
use std::time::Instant;

use crate::compression::ImageCompressor;
use crate::image::{ImageProcessor, ImageResize};
use crate::naming::derivative_keys;
use crate::upload::StoredOriginal;

/// Result of rendering one stored original.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub derivatives: DerivativeSet,
    /// Decoded source dimensions.
    pub width: u32,
    pub height: u32,
}

struct EncodedVariants {
    width: u32,
    height: u32,
    variants: Vec<(VariantLabel, Bytes)>,
}

#[derive(Clone)]
pub struct DerivativeRenderer {
    storage: Arc<dyn Storage>,
    format: OutputFormat,
    resize_quality: u8,
    original_quality: u8,
}

impl DerivativeRenderer {
    pub fn new(
        storage: Arc<dyn Storage>,
        format: OutputFormat,
        resize_quality: u8,
        original_quality: u8,
    ) -> Self {
        Self {
            storage,
            format,
            resize_quality,
            original_quality,
        }
    }

    /// Encode every variant from the decoded source. CPU-bound.
    fn encode_all(
        data: &[u8],
        format: OutputFormat,
        resize_quality: u8,
        original_quality: u8,
    ) -> anyhow::Result<EncodedVariants> {
        let source = ImageProcessor::decode(data)?;
        let (width, height) = (source.width(), source.height());

        let mut variants = Vec::with_capacity(VariantLabel::ALL.len());
        for label in VariantLabel::ALL {
            let encoded = match label.target_box() {
                Some((box_width, box_height)) => {
                    let resized = ImageResize::cover_fit(&source, box_width, box_height);
                    ImageCompressor::compress(&resized, format, resize_quality)
                }
                None => ImageCompressor::compress(&source, format, original_quality),
            }
            .map_err(|e| e.context(format!("failed to encode {} derivative", label)))?;
            variants.push((label, encoded));
        }

        Ok(EncodedVariants {
            width,
            height,
            variants,
        })
    }

    /// Render the derivative set for `original`.
    ///
    /// On success the stored original has been consumed. On failure no
    /// derivative of this candidate is left behind and the original remains.
    #[tracing::instrument(skip(self, original), fields(identifier = %original.identifier))]
    pub async fn render(
        &self,
        category: &str,
        original: &StoredOriginal,
        filename: &str,
    ) -> MediaResult<RenderedImage> {
        let start = Instant::now();
        let fail = |reason: String| MediaError::ImageProcessingFailed {
            filename: filename.to_string(),
            reason,
        };

        let data = self
            .storage
            .read(&original.storage_key)
            .await
            .map_err(|e| fail(e.to_string()))?;

        let (format, resize_quality, original_quality) =
            (self.format, self.resize_quality, self.original_quality);
        // Decode/resize/encode is CPU-bound; run off the async pool.
        let encoded = tokio::task::spawn_blocking(move || {
            Self::encode_all(&data, format, resize_quality, original_quality)
        })
        .await
        .map_err(|e| fail(format!("render task failed: {}", e)))?
        .map_err(|e| fail(format!("{:#}", e)))?;

        let derivatives = derivative_keys(category, original.identifier, self.format);
        let mut written: Vec<&str> = Vec::with_capacity(encoded.variants.len());

        for (label, bytes) in encoded.variants {
            let key = derivatives.get(label);
            if let Err(e) = self.storage.write(key, bytes.to_vec()).await {
                tracing::warn!(
                    error = %e,
                    storage_key = %key,
                    label = %label,
                    "Derivative write failed, rolling back"
                );
                self.rollback(&written).await;
                return Err(fail(format!("failed to write {} derivative: {}", label, e)));
            }
            written.push(key);
        }

        // Every derivative is durable; the upload bytes are no longer needed.
        if let Err(e) = self.storage.delete(&original.storage_key).await {
            tracing::warn!(
                error = %e,
                storage_key = %original.storage_key,
                "Failed to delete stored original after rendering"
            );
        }

        tracing::info!(
            width = encoded.width,
            height = encoded.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Rendered derivative set"
        );

        Ok(RenderedImage {
            derivatives,
            width: encoded.width,
            height: encoded.height,
        })
    }

    async fn rollback(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::error!(
                    error = %e,
                    storage_key = %key,
                    "Failed to remove partial derivative"
                );
            }
        }
    }
}
