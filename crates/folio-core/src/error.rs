//! Error types module
//!
//! All failures the ingestion pipeline can report are unified under
//! [`MediaError`]. Intake errors are returned per candidate so a batch can be
//! partially accepted; only [`MediaError::FatalStorage`] and a rejected
//! [`MediaError::TooManyFiles`] batch abort a whole request.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like intake rejections
    Debug,
    /// Warning level - for per-candidate failures the batch survives
    Warn,
    /// Error level - for failures that make the pipeline unusable
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// by the HTTP layer that invokes the pipeline.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PAYLOAD_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from end users
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Unsupported media type: {media_type} ({filename})")]
    UnsupportedMediaType { filename: String, media_type: String },

    #[error("File too large: {filename} is {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { filename: String, size: u64, max: u64 },

    #[error("Too many files: {count} submitted (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("Storage unavailable: {0}")]
    FatalStorage(String),

    #[error("Image processing failed for {filename}: {reason}")]
    ImageProcessingFailed { filename: String, reason: String },

    #[error("Not processed: {filename} ({reason})")]
    NotProcessed { filename: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn media_error_static_metadata(
    err: &MediaError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        MediaError::UnsupportedMediaType { .. } => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload a JPEG, PNG or WebP image"),
            false,
            LogLevel::Debug,
        ),
        MediaError::PayloadTooLarge { .. } => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        MediaError::TooManyFiles { .. } => (
            413,
            "TOO_MANY_FILES",
            false,
            Some("Upload fewer photos per request"),
            false,
            LogLevel::Debug,
        ),
        MediaError::FatalStorage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        MediaError::ImageProcessingFailed { .. } => (
            500,
            "IMAGE_PROCESSING_ERROR",
            true,
            Some("Check the image is not corrupt and try again"),
            false,
            LogLevel::Warn,
        ),
        MediaError::NotProcessed { .. } => (
            503,
            "NOT_PROCESSED",
            true,
            Some("Resubmit the photos that were not processed"),
            false,
            LogLevel::Debug,
        ),
        MediaError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl MediaError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            MediaError::UnsupportedMediaType { .. } => "UnsupportedMediaType",
            MediaError::PayloadTooLarge { .. } => "PayloadTooLarge",
            MediaError::TooManyFiles { .. } => "TooManyFiles",
            MediaError::FatalStorage(_) => "FatalStorageError",
            MediaError::ImageProcessingFailed { .. } => "ImageProcessingFailed",
            MediaError::NotProcessed { .. } => "NotProcessed",
            MediaError::Internal(_) => "Internal",
        }
    }

    /// True for rejections decided before any byte was written.
    pub fn is_intake_rejection(&self) -> bool {
        matches!(
            self,
            MediaError::UnsupportedMediaType { .. }
                | MediaError::PayloadTooLarge { .. }
                | MediaError::TooManyFiles { .. }
        )
    }
}

impl ErrorMetadata for MediaError {
    fn http_status_code(&self) -> u16 {
        media_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        media_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        media_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        media_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        media_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        media_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            MediaError::UnsupportedMediaType { media_type, .. } => {
                format!("Unsupported media type: {}", media_type)
            }
            MediaError::PayloadTooLarge { filename, max, .. } => format!(
                "{} exceeds the maximum size of {} MB",
                filename,
                max / 1024 / 1024
            ),
            MediaError::TooManyFiles { max, .. } => {
                format!("At most {} photos can be uploaded at once", max)
            }
            MediaError::FatalStorage(_) => "Failed to access storage".to_string(),
            MediaError::ImageProcessingFailed { filename, .. } => {
                format!("Could not process image {}", filename)
            }
            MediaError::NotProcessed { filename, .. } => {
                format!("{} was not processed", filename)
            }
            MediaError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
