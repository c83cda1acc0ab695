//! Loading and decoding with size limits and a decode timeout.

use image::{GenericImageView, ImageFormat};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use super::validate::sniff_format;
use super::{ImageInput, InputFormat};
use crate::config::LimitsConfig;
use crate::error::ImageError;

/// Loads user images, enforcing the configured limits.
pub struct ImageLoader {
    limits: LimitsConfig,
}

impl ImageLoader {
    /// Create a new loader with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read, validate and decode an image file.
    pub async fn load(&self, path: &Path) -> Result<ImageInput, ImageError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImageError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => {
                return Err(ImageError::Read {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        if !metadata.is_file() {
            return Err(ImageError::Read {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        self.check_size(path, metadata.len())?;

        let bytes = tokio::fs::read(path).await.map_err(|e| ImageError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        self.load_bytes(bytes, path).await
    }

    /// Validate and decode an image that is already in memory.
    ///
    /// `path` is only used for error messages and the display name.
    pub async fn load_bytes(&self, bytes: Vec<u8>, path: &Path) -> Result<ImageInput, ImageError> {
        self.check_size(path, bytes.len() as u64)?;

        let format = sniff_format(&bytes).map_err(|name| ImageError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: name.to_string(),
        })?;

        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);
        let path_owned = path.to_path_buf();

        let decode_result = timeout(timeout_duration, async move {
            tokio::task::spawn_blocking(move || {
                let dims = decode_dimensions(&bytes, format, &path_owned);
                dims.map(|(w, h)| (bytes, w, h))
            })
            .await
        })
        .await;

        let (bytes, width, height) = match decode_result {
            Ok(Ok(Ok(decoded))) => decoded,
            Ok(Ok(Err(e))) => return Err(e),
            Ok(Err(e)) => {
                return Err(ImageError::Decode {
                    path: path.to_path_buf(),
                    message: format!("Task join error: {e}"),
                })
            }
            Err(_) => {
                return Err(ImageError::Timeout {
                    path: path.to_path_buf(),
                    timeout_ms: self.limits.decode_timeout_ms,
                })
            }
        };

        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(ImageError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }

        tracing::debug!(
            "Loaded {} image {width}x{height} ({} bytes) from {:?}",
            format,
            bytes.len(),
            path
        );

        Ok(ImageInput {
            bytes,
            format,
            width,
            height,
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        })
    }

    fn check_size(&self, path: &Path, len: u64) -> Result<(), ImageError> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if len > max_bytes {
            return Err(ImageError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }
}

/// Decode the full raster (runs in spawn_blocking) and report its dimensions.
fn decode_dimensions(
    bytes: &[u8],
    format: InputFormat,
    path: &Path,
) -> Result<(u32, u32), ImageError> {
    let image_format = match format {
        InputFormat::Jpeg => ImageFormat::Jpeg,
        InputFormat::Png => ImageFormat::Png,
    };
    let image = image::load_from_memory_with_format(bytes, image_format).map_err(|e| {
        ImageError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    Ok(image.dimensions())
}
