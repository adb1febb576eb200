use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Output size of a cover fit into `box_width`×`box_height`.
    ///
    /// The box is first clamped to the source on each axis, so the result
    /// never exceeds the source resolution.
    pub fn cover_fit_dimensions(
        orig_width: u32,
        orig_height: u32,
        box_width: u32,
        box_height: u32,
    ) -> (u32, u32) {
        (
            box_width.min(orig_width).max(1),
            box_height.min(orig_height).max(1),
        )
    }

    /// Intermediate size the source is scaled to before the centered crop.
    fn scaled_dimensions(
        orig_width: u32,
        orig_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> (u32, u32) {
        let scale = (target_width as f64 / orig_width as f64)
            .max(target_height as f64 / orig_height as f64);

        if scale >= 1.0 {
            return (orig_width, orig_height);
        }

        let width = ((orig_width as f64 * scale).round() as u32).clamp(target_width, orig_width);
        let height =
            ((orig_height as f64 * scale).round() as u32).clamp(target_height, orig_height);
        (width, height)
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Fill the box completely, preserving aspect ratio and cropping the
    /// overflow around the center. Never upscales.
    pub fn cover_fit(img: &DynamicImage, box_width: u32, box_height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let (target_width, target_height) =
            Self::cover_fit_dimensions(orig_width, orig_height, box_width, box_height);
        let (scaled_width, scaled_height) =
            Self::scaled_dimensions(orig_width, orig_height, target_width, target_height);

        let x = (scaled_width - target_width) / 2;
        let y = (scaled_height - target_height) / 2;

        if (scaled_width, scaled_height) == (orig_width, orig_height) {
            return img.crop_imm(x, y, target_width, target_height);
        }

        let filter = Self::select_filter(orig_width, orig_height, scaled_width, scaled_height);
        img.resize_exact(scaled_width, scaled_height, filter)
            .crop_imm(x, y, target_width, target_height)
    }
}
