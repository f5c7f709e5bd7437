//! Photo Vault - Thumbnail Engine
//!
//! Square thumbnails for the photo grid. Generated on demand, never stored.

use std::io::Cursor;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::error::{VaultError, VaultResult};

/// Thumbnail Engine
pub struct ThumbnailEngine {
    /// Thumbnail size (square)
    size: u32,
}

impl ThumbnailEngine {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    /// Generate a JPEG thumbnail from image data
    pub fn generate(&self, image_data: &[u8]) -> VaultResult<Vec<u8>> {
        let img = image::load_from_memory(image_data)
            .map_err(|e| VaultError::ImageError(format!("thumbnail: {}", e)))?;

        let thumb = DynamicImage::ImageRgb8(self.crop_and_resize(&img).to_rgb8());

        let mut output = Vec::new();
        thumb.write_to(&mut Cursor::new(&mut output), image::ImageFormat::Jpeg)?;

        Ok(output)
    }

    /// Center-crop to a square, then resize
    fn crop_and_resize(&self, img: &DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();

        let (crop_x, crop_y, crop_size) = if width > height {
            ((width - height) / 2, 0, height)
        } else {
            (0, (height - width) / 2, width)
        };

        img.crop_imm(crop_x, crop_y, crop_size, crop_size)
            .resize_exact(self.size, self.size, FilterType::Lanczos3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_generation() {
        let img = image::DynamicImage::new_rgb8(800, 600);
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png).unwrap();

        let engine = ThumbnailEngine::new(128);
        let thumb = engine.generate(&buffer).unwrap();

        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (128, 128));
    }

    #[test]
    fn test_thumbnail_rejects_garbage() {
        let engine = ThumbnailEngine::new(64);
        assert!(engine.generate(b"garbage").is_err());
    }
}
