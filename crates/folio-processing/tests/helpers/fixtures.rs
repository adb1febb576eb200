use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Gradient so encoders have something to chew on.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn create_test_webp(width: u32, height: u32) -> Vec<u8> {
    let rgba = gradient(width, height).to_rgba8();
    webp::Encoder::from_rgba(&rgba, width, height)
        .encode(80.0)
        .to_vec()
}

/// Bytes a client might label `image/jpeg` that no decoder accepts.
pub fn corrupt_jpeg() -> Vec<u8> {
    b"this is not really a jpeg, just text with the wrong label".to_vec()
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}
