use image::{DynamicImage, ImageFormat};
use social_accounts_application::error::{AppError, AppResult};
use std::io::Cursor;
use tracing::{debug, instrument};

#[derive(Copy, Clone)]
pub struct WebpAvatarConfig {
    pub max_dimension: u32,
}

/// Normalizes any decodable image into a bounded WebP avatar.
#[derive(Clone)]
pub struct WebpAvatarEncoder {
    max_dimension: u32,
}

impl WebpAvatarEncoder {
    pub fn new(config: WebpAvatarConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
        }
    }

    #[instrument(skip(self, source_bytes), fields(source_len = source_bytes.len()))]
    pub fn encode(&self, source_bytes: &[u8]) -> AppResult<Vec<u8>> {
        let source = image::load_from_memory(source_bytes).map_err(|e| {
            AppError::UnsupportedImage {
                message: format!("Unsupported or corrupt image: {}", e),
            }
        })?;

        let resized = if source.width() > self.max_dimension || source.height() > self.max_dimension
        {
            source.thumbnail(self.max_dimension, self.max_dimension)
        } else {
            source
        };

        // The WebP encoder only accepts 8-bit RGB(A).
        let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());

        let mut webp_bytes = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut webp_bytes), ImageFormat::WebP)
            .map_err(|e| AppError::AvatarIngestion {
                message: format!("Failed to encode WebP: {}", e),
            })?;

        if webp_bytes.is_empty() {
            return Err(AppError::AvatarIngestion {
                message: "WebP encoding produced empty output".to_string(),
            });
        }

        debug!(
            "Encoded avatar {}x{} -> {} bytes",
            rgba.width(),
            rgba.height(),
            webp_bytes.len()
        );
        Ok(webp_bytes)
    }
}
