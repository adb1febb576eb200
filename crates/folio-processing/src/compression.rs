use anyhow::{anyhow, Result};
use bytes::Bytes;
use folio_core::OutputFormat;
use image::{DynamicImage, GenericImageView};
use std::panic::{self, AssertUnwindSafe};

/// Lossy encoder for derivatives
pub struct ImageCompressor;

impl ImageCompressor {
    /// Compress image with specified format and quality (0-100)
    pub fn compress(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Bytes> {
        let quality = quality.clamp(1, 100);
        let data = match format {
            OutputFormat::WebP => Self::compress_webp(img, quality)?,
            OutputFormat::Jpeg => Self::compress_jpeg(img, quality)?,
        };

        if data.is_empty() {
            return Err(anyhow!("{:?} encoder produced no data", format));
        }
        Ok(data)
    }

    /// Compress to JPEG using mozjpeg
    fn compress_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // libjpeg reports fatal errors by unwinding.
        let encoded = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
            let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
            comp.set_size(width as usize, height as usize);
            comp.set_quality(quality as f32);
            comp.set_progressive_mode();
            comp.set_optimize_coding(true);

            let mut comp = comp.start_compress(Vec::new())?;
            comp.write_scanlines(&rgb_img)?;
            comp.finish()
        }))
        .map_err(|_| anyhow!("mozjpeg aborted while encoding {}x{}", width, height))??;

        Ok(Bytes::from(encoded))
    }

    /// Compress to WebP
    fn compress_webp(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        let (width, height) = img.dimensions();

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();

        // libwebp caps each side at 16383 px; `encode` would unwrap that error.
        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder
            .encode_simple(false, quality as f32)
            .map_err(|e| anyhow!("webp encode failed for {}x{}: {:?}", width, height, e))?;

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}
