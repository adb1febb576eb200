//! Image processor - decoding and validation

use anyhow::{bail, Context, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Sniff the container from the leading bytes.
    pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .format()
    }

    /// Decode an uploaded image.
    ///
    /// The container is sniffed from the bytes rather than trusted from the
    /// declared type. Empty input is an error.
    pub fn decode(data: &[u8]) -> Result<DynamicImage> {
        if data.is_empty() {
            bail!("empty file");
        }

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .context("failed to read image header")?;

        match reader.format() {
            Some(ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) => {}
            Some(other) => bail!("unsupported container: {:?}", other),
            None => bail!("unrecognized image data"),
        }

        let img = reader.decode().context("failed to decode image")?;
        if img.width() == 0 || img.height() == 0 {
            bail!("image has no pixels");
        }
        Ok(img)
    }
}
