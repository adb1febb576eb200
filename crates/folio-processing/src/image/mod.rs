//! Image processing module
//!
//! - Decoding and validation (processor)
//! - Cover-fit resizing (resize)

pub mod processor;
pub mod resize;

pub use processor::ImageProcessor;
pub use resize::ImageResize;
