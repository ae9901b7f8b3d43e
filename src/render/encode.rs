//! Frame encoding (JPEG for the live feed, PNG for legacy mode).

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::core::FrameFormat;

/// Encodes captured surface images into published frame bytes.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    format: FrameFormat,
    quality: u8,
}

impl FrameEncoder {
    /// `quality` applies to JPEG only and is clamped to 1..=100.
    pub fn new(format: FrameFormat, quality: u8) -> Self {
        Self { format, quality: quality.clamp(1, 100) }
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn encode(&self, image: RgbaImage) -> Result<Vec<u8>, image::ImageError> {
        let (width, height) = image.dimensions();
        let mut bytes: Vec<u8> = Vec::new();

        match self.format {
            FrameFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
                encoder.encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
            FrameFormat::Png => {
                PngEncoder::new(&mut bytes).write_image(
                    image.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
            }
        }

        log::trace!("Encoded {}x{} {} frame: {} bytes", width, height, self.format, bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([20, 40, 200, 255])
            }
        })
    }

    #[test]
    fn test_jpeg_frame() {
        let bytes = FrameEncoder::new(FrameFormat::Jpeg, 30).encode(checker(64, 48)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_png_frame_is_lossless() {
        let source = checker(32, 32);
        let bytes = FrameEncoder::new(FrameFormat::Png, 30).encode(source.clone()).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, source);
    }

    #[test]
    fn test_quality_clamped() {
        let encoder = FrameEncoder::new(FrameFormat::Jpeg, 0);
        assert!(encoder.encode(checker(8, 8)).is_ok());
    }
}
