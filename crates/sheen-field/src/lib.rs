//! Silhouette field extraction for the liquid-logo renderer.
//!
//! A logo image (PNG, or anything the `image` crate decodes) is reduced to a
//! single-channel coverage grid at a fixed working resolution. The grid is
//! immutable after creation; the renderer uploads it once as an `R8Unorm`
//! texture and never touches the source image again.
//!
//! Silhouette rule:
//! - images with meaningful transparency use the alpha channel as the mask
//! - fully opaque images are treated as dark-on-light artwork and use
//!   inverted luminance

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

/// Fixed working resolution of the silhouette field, independent of both the
/// source image size and the window size.
pub const FIELD_SIZE: u32 = 512;

/// Alpha values above this count as "effectively opaque" when deciding
/// whether the image carries a usable alpha channel.
const OPAQUE_ALPHA: u8 = 250;

/// Errors produced while turning image bytes into a field.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("failed to decode logo image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A `FIELD_SIZE x FIELD_SIZE` grid of coverage values in `[0, 1]`.
///
/// The source image is letterboxed into the square grid preserving its
/// aspect ratio; uncovered rows/columns stay at zero coverage.
#[derive(Debug)]
pub struct ImageField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl ImageField {
    /// Decode raw image bytes and extract the silhouette field.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FieldError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(&img))
    }

    /// Extract the silhouette field from an already decoded image.
    pub fn from_image(img: &DynamicImage) -> Self {
        let (src_w, src_h) = (img.width().max(1), img.height().max(1));

        // Fit the image into the square working grid, preserving aspect.
        let scale = (FIELD_SIZE as f32 / src_w as f32).min(FIELD_SIZE as f32 / src_h as f32);
        let fit_w = ((src_w as f32 * scale).round() as u32).clamp(1, FIELD_SIZE);
        let fit_h = ((src_h as f32 * scale).round() as u32).clamp(1, FIELD_SIZE);

        let rgba: RgbaImage = img
            .resize_exact(fit_w, fit_h, FilterType::Triangle)
            .to_rgba8();

        let use_alpha = rgba.pixels().any(|p| p[3] < OPAQUE_ALPHA);

        let mut values = vec![0.0f32; (FIELD_SIZE * FIELD_SIZE) as usize];
        let x0 = (FIELD_SIZE - fit_w) / 2;
        let y0 = (FIELD_SIZE - fit_h) / 2;

        for (x, y, p) in rgba.enumerate_pixels() {
            let coverage = if use_alpha {
                p[3] as f32 / 255.0
            } else {
                1.0 - luminance(p[0], p[1], p[2])
            };

            let idx = ((y0 + y) * FIELD_SIZE + (x0 + x)) as usize;
            values[idx] = coverage.clamp(0.0, 1.0);
        }

        log::debug!(
            "extracted {}x{} silhouette field from {}x{} image (mask: {})",
            FIELD_SIZE,
            FIELD_SIZE,
            src_w,
            src_h,
            if use_alpha { "alpha" } else { "luminance" }
        );

        Self {
            width: FIELD_SIZE,
            height: FIELD_SIZE,
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major coverage values, length `FIELD_SIZE * FIELD_SIZE`.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Coverage at a grid cell. Out-of-range coordinates return zero.
    pub fn sample(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.values[(y * self.width + x) as usize]
    }

    /// Quantize to 8-bit coverage for an `R8Unorm` texture upload.
    pub fn to_r8(&self) -> Vec<u8> {
        self.values
            .iter()
            .map(|v| (v * 255.0).round() as u8)
            .collect()
    }
}

fn luminance(r: u8, g: u8, b: u8) -> f32 {
    (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(img: RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn field_has_working_resolution() {
        let img = RgbaImage::from_pixel(10, 4, Rgba([255, 255, 255, 255]));
        let field = ImageField::from_bytes(&png_bytes(img)).unwrap();

        assert_eq!(field.width(), FIELD_SIZE);
        assert_eq!(field.height(), FIELD_SIZE);
        assert_eq!(field.values().len(), (FIELD_SIZE * FIELD_SIZE) as usize);
    }

    #[test]
    fn values_stay_in_unit_range() {
        let mut img = RgbaImage::new(8, 8);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([(x * 32) as u8, (y * 32) as u8, 128, 200]);
        }
        let field = ImageField::from_bytes(&png_bytes(img)).unwrap();

        assert!(field.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn alpha_channel_drives_transparent_images() {
        // Transparent background, one opaque block in the middle.
        let mut img = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 0]));
        for y in 6..10 {
            for x in 6..10 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let field = ImageField::from_bytes(&png_bytes(img)).unwrap();

        let mid = FIELD_SIZE / 2;
        assert!(field.sample(mid, mid) > 0.9);
        assert!(field.sample(2, 2) < 0.05);
    }

    #[test]
    fn inverted_luminance_drives_opaque_images() {
        // Fully opaque: black artwork on white background.
        let mut img = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]));
        for y in 6..10 {
            for x in 6..10 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let field = ImageField::from_bytes(&png_bytes(img)).unwrap();

        let mid = FIELD_SIZE / 2;
        assert!(field.sample(mid, mid) > 0.9);
        assert!(field.sample(2, 2) < 0.05);
    }

    #[test]
    fn wide_images_are_letterboxed() {
        let img = RgbaImage::from_pixel(100, 10, Rgba([0, 0, 0, 255]));
        let field = ImageField::from_bytes(&png_bytes(img)).unwrap();

        // Top and bottom bands stay empty; the centered strip is covered.
        assert_eq!(field.sample(FIELD_SIZE / 2, 0), 0.0);
        assert_eq!(field.sample(FIELD_SIZE / 2, FIELD_SIZE - 1), 0.0);
        assert!(field.sample(FIELD_SIZE / 2, FIELD_SIZE / 2) > 0.9);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = ImageField::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, FieldError::Decode(_)));
    }

    #[test]
    fn out_of_range_sample_is_zero() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let field = ImageField::from_bytes(&png_bytes(img)).unwrap();

        assert_eq!(field.sample(FIELD_SIZE, 0), 0.0);
        assert_eq!(field.sample(0, FIELD_SIZE + 7), 0.0);
    }

    #[test]
    fn quantized_upload_matches_field_length() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let field = ImageField::from_bytes(&png_bytes(img)).unwrap();

        let bytes = field.to_r8();
        assert_eq!(bytes.len(), field.values().len());
        let mid = (FIELD_SIZE / 2 * FIELD_SIZE + FIELD_SIZE / 2) as usize;
        assert_eq!(bytes[mid], 255);
    }
}
