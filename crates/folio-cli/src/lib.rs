use folio_core::{ErrorMetadata, ImageType, MediaError};
use folio_processing::CandidateResult;
use serde_json::{json, Value};
use std::path::Path;

/// Fallback declared type for files whose extension says nothing useful.
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Guess the declared media type from a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageType::from_declared)
        .map(ImageType::mime_type)
        .unwrap_or(UNKNOWN_CONTENT_TYPE)
}

/// JSON view of one candidate outcome.
pub fn outcome_json(result: &CandidateResult) -> Value {
    match result {
        Ok(item) => json!({ "status": "accepted", "result": item }),
        Err(e) => json!({
            "status": "rejected",
            "filename": rejected_filename(e),
            "error_code": e.error_code(),
            "http_status": e.http_status_code(),
            "error": e.to_string(),
        }),
    }
}

fn rejected_filename(e: &MediaError) -> Option<&str> {
    match e {
        MediaError::UnsupportedMediaType { filename, .. }
        | MediaError::PayloadTooLarge { filename, .. }
        | MediaError::ImageProcessingFailed { filename, .. }
        | MediaError::NotProcessed { filename, .. } => Some(filename.as_str()),
        _ => None,
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
