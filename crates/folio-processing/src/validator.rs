use folio_core::{
    ImageType, MediaError, MediaResult, OverflowPolicy, PipelineConfig, UploadCandidate,
};

/// Intake filter
///
/// Pure predicates evaluated before any byte of a candidate is persisted.
/// Candidates are judged independently; the batch count is checked up front.
#[derive(Debug, Clone)]
pub struct IntakeFilter {
    max_file_size: u64,
    max_files_per_batch: usize,
    overflow_policy: OverflowPolicy,
    allowed_types: Vec<ImageType>,
}

impl IntakeFilter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes,
            max_files_per_batch: config.max_files_per_batch,
            overflow_policy: config.overflow_policy,
            allowed_types: config.allowed_types.clone(),
        }
    }

    /// Resolve the declared media type against the allow-list.
    pub fn check_type(&self, filename: &str, content_type: &str) -> MediaResult<ImageType> {
        ImageType::from_declared(content_type)
            .filter(|image_type| self.allowed_types.contains(image_type))
            .ok_or_else(|| MediaError::UnsupportedMediaType {
                filename: filename.to_string(),
                media_type: content_type.to_string(),
            })
    }

    /// Enforce the per-file ceiling. Zero-byte files pass here and fail at decode.
    pub fn check_size(&self, filename: &str, size: u64) -> MediaResult<()> {
        if size > self.max_file_size {
            return Err(MediaError::PayloadTooLarge {
                filename: filename.to_string(),
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Type first, then declared size.
    pub fn check(&self, candidate: &UploadCandidate) -> MediaResult<ImageType> {
        let image_type = self.check_type(&candidate.original_filename, &candidate.content_type)?;
        self.check_size(&candidate.original_filename, candidate.declared_size)?;
        Ok(image_type)
    }

    /// How many candidates of a batch of `count` may proceed.
    ///
    /// Under [`OverflowPolicy::Reject`] an oversized batch is refused outright.
    pub fn admit_batch(&self, count: usize) -> MediaResult<usize> {
        if count <= self.max_files_per_batch {
            return Ok(count);
        }
        match self.overflow_policy {
            OverflowPolicy::Reject => Err(self.too_many(count)),
            OverflowPolicy::Truncate => Ok(self.max_files_per_batch),
        }
    }

    pub fn too_many(&self, count: usize) -> MediaError {
        MediaError::TooManyFiles {
            count,
            max: self.max_files_per_batch,
        }
    }
}
