//! Configuration module
//!
//! Thresholds for the ingestion pipeline live in an explicit [`PipelineConfig`]
//! passed in at construction. `Default` gives the documented out-of-the-box
//! values; `from_env` layers environment overrides (and an optional `.env`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::{ImageType, OutputFormat};

const STORAGE_ROOT: &str = "uploads";
const DEFAULT_CATEGORY: &str = "items";
const MAX_FILE_SIZE_MB: u64 = 10;
const MAX_FILES_PER_BATCH: usize = 5;
const RESIZE_QUALITY: u8 = 85;
const ORIGINAL_QUALITY: u8 = 90;
const MAX_CONCURRENT_CANDIDATES: usize = 1;

/// What to do with a batch that carries more files than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Reject the whole batch before any candidate is touched.
    #[default]
    Reject,
    /// Process the first `max_files_per_batch` candidates, reject the rest.
    Truncate,
}

impl FromStr for OverflowPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(OverflowPolicy::Reject),
            "truncate" => Ok(OverflowPolicy::Truncate),
            _ => Err(anyhow::anyhow!("Invalid overflow policy: {}", s)),
        }
    }
}

/// Ingestion pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Base directory; each upload category gets a flat subdirectory.
    /// Only read when the pipeline builds its own local storage.
    pub storage_root: PathBuf,
    pub default_category: String,
    pub max_file_size_bytes: u64,
    pub max_files_per_batch: usize,
    pub overflow_policy: OverflowPolicy,
    pub allowed_types: Vec<ImageType>,
    pub output_format: OutputFormat,
    /// Encoder quality (0-100) for the four resized presets.
    pub resize_quality: u8,
    /// Encoder quality (0-100) for the full-size re-encode.
    pub original_quality: u8,
    /// Stop starting new candidates after the first failure.
    pub fail_fast: bool,
    pub max_concurrent_candidates: usize,
    /// Wall-clock budget for a batch, checked before each candidate starts.
    pub batch_deadline: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(STORAGE_ROOT),
            default_category: DEFAULT_CATEGORY.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files_per_batch: MAX_FILES_PER_BATCH,
            overflow_policy: OverflowPolicy::default(),
            allowed_types: ImageType::ALL.to_vec(),
            output_format: OutputFormat::default(),
            resize_quality: RESIZE_QUALITY,
            original_quality: ORIGINAL_QUALITY,
            fail_fast: false,
            max_concurrent_candidates: MAX_CONCURRENT_CANDIDATES,
            batch_deadline: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let defaults = Self::default();

        let max_file_size_mb = lookup("FOLIO_MAX_FILE_SIZE_MB")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_types = match lookup("FOLIO_ALLOWED_CONTENT_TYPES") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    ImageType::from_declared(s)
                        .ok_or_else(|| anyhow::anyhow!("Unsupported allowed content type: {}", s))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.allowed_types,
        };

        let overflow_policy = match lookup("FOLIO_OVERFLOW_POLICY") {
            Some(s) => s.parse()?,
            None => OverflowPolicy::default(),
        };

        let output_format = match lookup("FOLIO_OUTPUT_FORMAT") {
            Some(s) => OutputFormat::parse(&s)?,
            None => OutputFormat::default(),
        };

        let config = PipelineConfig {
            storage_root: lookup("FOLIO_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            default_category: lookup("FOLIO_DEFAULT_CATEGORY")
                .map(|s| s.trim().to_string())
                .unwrap_or(defaults.default_category),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_files_per_batch: lookup("FOLIO_MAX_FILES_PER_BATCH")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(MAX_FILES_PER_BATCH),
            overflow_policy,
            allowed_types,
            output_format,
            resize_quality: lookup("FOLIO_RESIZE_QUALITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(RESIZE_QUALITY),
            original_quality: lookup("FOLIO_ORIGINAL_QUALITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(ORIGINAL_QUALITY),
            fail_fast: lookup("FOLIO_FAIL_FAST")
                .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            max_concurrent_candidates: lookup("FOLIO_MAX_CONCURRENT_CANDIDATES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(MAX_CONCURRENT_CANDIDATES),
            batch_deadline: lookup("FOLIO_BATCH_DEADLINE_SECS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            anyhow::bail!("max_file_size_bytes must be greater than zero");
        }
        if self.max_files_per_batch == 0 {
            anyhow::bail!("max_files_per_batch must be greater than zero");
        }
        if self.max_concurrent_candidates == 0 {
            anyhow::bail!("max_concurrent_candidates must be at least 1");
        }
        if self.allowed_types.is_empty() {
            anyhow::bail!("at least one content type must be allowed");
        }
        for (name, quality) in [
            ("resize_quality", self.resize_quality),
            ("original_quality", self.original_quality),
        ] {
            if !(1..=100).contains(&quality) {
                anyhow::bail!("{} must be between 1 and 100, got {}", name, quality);
            }
        }
        if self.default_category.is_empty()
            || self.default_category.contains(['/', '\\'])
            || self.default_category.starts_with('.')
        {
            anyhow::bail!("invalid default category: {:?}", self.default_category);
        }
        Ok(())
    }

    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    pub fn is_allowed(&self, image_type: ImageType) -> bool {
        self.allowed_types.contains(&image_type)
    }
}
