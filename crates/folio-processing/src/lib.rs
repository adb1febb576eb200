//! Folio Media Processing Library
//!
//! This crate turns uploaded item photos into a fixed set of derivatives:
//! intake filtering, naming, cover-fit resizing, encoding, and best-effort
//! reclamation once the owning record goes away.

pub mod compression;
pub mod image;
pub mod naming;
pub mod reclaim;
pub mod renderer;
pub mod upload;
pub mod validator;

// Re-export commonly used types
pub use compression::ImageCompressor;
pub use crate::image::{ImageProcessor, ImageResize};
pub use naming::new_identifier;
pub use reclaim::{ReclaimSummary, ReclaimTarget, ReclamationService};
pub use renderer::{DerivativeRenderer, RenderedImage};
pub use upload::{CandidateResult, StoredOriginal, UploadPipeline};
pub use validator::IntakeFilter;
