//! Uploaded image handling.
//!
//! Images land in the configured upload directory under a generated name;
//! the stored record keeps only that file name. Replacing an image removes
//! the old file best-effort.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;

use menucard_core::validation::limits::MAX_IMAGE_SIZE;

/// Extensions accepted for uploaded images.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Uploaded file exceeds the size cap.
    #[error("File too large (max {max} bytes)")]
    TooLarge {
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// File extension outside the image allowlist.
    #[error("Invalid file type, only JPG/JPEG/PNG allowed")]
    InvalidType,

    /// IO error writing or removing the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract and check the image extension of an uploaded file name.
///
/// # Errors
///
/// Returns [`UploadError::InvalidType`] for anything but jpg/jpeg/png.
pub fn image_extension(filename: &str) -> Result<String, UploadError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or(UploadError::InvalidType)?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(UploadError::InvalidType)
    }
}

/// Store an uploaded image and return its generated file name.
///
/// The name is `{kind}-{id}-{nanos}.{ext}`, so successive uploads for the
/// same record never collide.
///
/// # Errors
///
/// Returns error on an oversized file, a disallowed extension, or an IO
/// failure.
pub async fn save_image(
    dir: &Path,
    kind: &str,
    id: u64,
    filename: &str,
    data: &[u8],
) -> Result<String, UploadError> {
    if data.len() > MAX_IMAGE_SIZE {
        return Err(UploadError::TooLarge {
            max: MAX_IMAGE_SIZE,
        });
    }

    let ext = image_extension(filename)?;
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let name = format!("{kind}-{id}-{nanos}.{ext}");

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&name), data).await?;

    Ok(name)
}

/// Remove a previously stored image, ignoring files already gone.
///
/// Names come from our own records, but a name that escapes the upload
/// directory is refused anyway.
pub async fn remove_image(dir: &Path, name: &str) {
    if name.is_empty() || name.contains('/') || name.contains("..") {
        tracing::warn!(name, "Refusing to remove suspicious upload name");
        return;
    }

    match tokio::fs::remove_file(dir.join(name)).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(name, error = %e, "Failed to remove old upload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extension_allowlist() {
        assert_eq!(image_extension("logo.PNG").unwrap(), "png");
        assert_eq!(image_extension("photo.jpeg").unwrap(), "jpeg");
        assert!(matches!(
            image_extension("menu.pdf"),
            Err(UploadError::InvalidType)
        ));
        assert!(matches!(
            image_extension("no-extension"),
            Err(UploadError::InvalidType)
        ));
    }

    #[tokio::test]
    async fn save_and_remove() {
        let dir = TempDir::new().unwrap();

        let name = save_image(dir.path(), "cafe", 42, "logo.png", b"png-bytes")
            .await
            .unwrap();
        assert!(name.starts_with("cafe-42-"));
        assert!(name.ends_with(".png"));
        assert!(dir.path().join(&name).exists());

        remove_image(dir.path(), &name).await;
        assert!(!dir.path().join(&name).exists());

        // Removing again is not an error.
        remove_image(dir.path(), &name).await;
    }

    #[tokio::test]
    async fn rejects_oversized_upload() {
        let dir = TempDir::new().unwrap();
        let data = vec![0u8; MAX_IMAGE_SIZE + 1];

        let result = save_image(dir.path(), "food", 1, "big.jpg", &data).await;
        assert!(matches!(result, Err(UploadError::TooLarge { .. })));
    }

    #[tokio::test]
    async fn refuses_traversal_names() {
        let dir = TempDir::new().unwrap();
        // Nothing to assert beyond "does not panic and does not escape".
        remove_image(dir.path(), "../outside.png").await;
        remove_image(dir.path(), "").await;
    }
}
