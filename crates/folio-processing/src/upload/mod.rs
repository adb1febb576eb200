//! Upload pipeline: intake → place → render → hand back.

mod pipeline;
pub mod types;

pub use pipeline::UploadPipeline;
pub use types::{CandidateResult, StoredOriginal};
