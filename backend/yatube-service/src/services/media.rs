/// Uploaded image storage
///
/// Images live under `<root>/posts/<uuid>.<ext>`; the database stores the
/// path relative to `root`, which is also the path under `/media/`.
use crate::error::{AppError, Result};
use image::ImageFormat;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

const POSTS_DIR: &str = "posts";

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    max_upload_bytes: usize,
}

/// Reason an upload was refused, shown next to the form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    TooLarge { limit: usize },
    NotAnImage,
    UnsupportedFormat,
}

impl std::fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageRejection::TooLarge { limit } => {
                write!(f, "The file is too large (limit is {} bytes).", limit)
            }
            ImageRejection::NotAnImage => write!(
                f,
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
            ),
            ImageRejection::UnsupportedFormat => write!(f, "This image format is not supported."),
        }
    }
}

fn extension_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpg"),
        ImageFormat::Gif => Some("gif"),
        ImageFormat::WebP => Some("webp"),
        ImageFormat::Bmp => Some("bmp"),
        _ => None,
    }
}

/// Content type for a stored file, by extension
pub fn content_type_for(path: &str) -> mime::Mime {
    let ext = path.rsplit('.').next().map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("bmp") => mime::IMAGE_BMP,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, max_upload_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Check size and sniff the format from the leading bytes
    pub fn inspect(&self, bytes: &[u8]) -> std::result::Result<ImageFormat, ImageRejection> {
        if bytes.len() > self.max_upload_bytes {
            return Err(ImageRejection::TooLarge {
                limit: self.max_upload_bytes,
            });
        }
        let format = image::guess_format(bytes).map_err(|_| ImageRejection::NotAnImage)?;
        if extension_for(format).is_none() {
            return Err(ImageRejection::UnsupportedFormat);
        }
        Ok(format)
    }

    /// Write an inspected image and return its relative media path
    pub async fn save(&self, bytes: &[u8], format: ImageFormat) -> Result<String> {
        let ext = extension_for(format)
            .ok_or_else(|| AppError::Media(format!("unsupported image format {:?}", format)))?;
        let relative = format!("{}/{}.{}", POSTS_DIR, Uuid::new_v4(), ext);

        let dir = self.root.join(POSTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(self.root.join(&relative), bytes).await?;

        info!(path = %relative, size = bytes.len(), "stored uploaded image");
        Ok(relative)
    }

    /// Map a `/media/` request path to a file under the root.
    /// Returns `None` for anything that could escape the root.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let candidate = Path::new(relative);
        let safe = !relative.is_empty()
            && candidate
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            debug!(path = %relative, "rejected media path");
            return None;
        }
        Some(self.root.join(candidate))
    }

    /// Read a stored file; `Ok(None)` when it does not exist.
    /// Paths that would leave the root are refused with `Forbidden`.
    pub async fn read(&self, relative: &str) -> Result<Option<Vec<u8>>> {
        if relative.is_empty() {
            return Ok(None);
        }
        let Some(path) = self.resolve(relative) else {
            return Err(AppError::Forbidden);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
