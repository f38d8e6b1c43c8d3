//! Loading and inspecting files before upload

use std::io::Cursor;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::{ImageFormat, ImageReader};
use photonic_api_client::FileUpload;
use photonic_core::models::FileConfig;
use photonic_core::AppError;
use sha2::{Digest, Sha256};

/// Where the file to upload comes from
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on local disk
    Path(PathBuf),
    /// Bytes already in memory, with the client-side filename
    Bytes { data: Bytes, filename: String },
}

impl FileSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        FileSource::Path(path.into())
    }

    pub fn bytes(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        FileSource::Bytes {
            data: data.into(),
            filename: filename.into(),
        }
    }
}

/// File ready to upload, with the descriptor stored alongside the record
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub upload: FileUpload,
    pub config: FileConfig,
}

/// Read the file and reject anything that is not a recognised image.
pub async fn load(source: FileSource) -> Result<LoadedFile, AppError> {
    let (data, filename) = match source {
        FileSource::Path(path) => {
            let filename = file_name(&path)?;
            let data = tokio::fs::read(&path).await.map_err(|e| {
                AppError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
            })?;
            (Bytes::from(data), filename)
        }
        FileSource::Bytes { data, filename } => {
            let filename = filename.trim().to_string();
            if filename.is_empty() {
                return Err(AppError::InvalidInput("Filename cannot be empty".to_string()));
            }
            (data, filename)
        }
    };

    if data.is_empty() {
        return Err(AppError::InvalidInput(format!("File {} is empty", filename)));
    }

    let format = image::guess_format(&data).map_err(|_| {
        AppError::InvalidInput(format!("File {} is not a supported image", filename))
    })?;

    let config = describe(&data, &filename, format);
    tracing::debug!(
        filename = %filename,
        mime_type = ?config.mime_type,
        width = ?config.width,
        height = ?config.height,
        "Image inspected"
    );

    let upload = FileUpload::new(data, filename).with_content_type(format.to_mime_type());
    Ok(LoadedFile { upload, config })
}

fn file_name(path: &Path) -> Result<String, AppError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid file path: {}", path.display())))
}

fn describe(data: &[u8], filename: &str, format: ImageFormat) -> FileConfig {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .or_else(|| format.extensions_str().first().map(|ext| ext.to_string()));

    let dimensions = ImageReader::with_format(Cursor::new(data), format)
        .into_dimensions()
        .ok();

    let digest = hex::encode(Sha256::digest(data));
    let hash_name = match &extension {
        Some(ext) => format!("{}.{}", digest, ext),
        None => digest,
    };

    FileConfig {
        mime_type: Some(format.to_mime_type().to_string()),
        extension,
        size: Some(data.len() as u64),
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
        hash_name: Some(hash_name),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn loads_image_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Photo.PNG");
        tokio::fs::write(&path, png_bytes(4, 3)).await.unwrap();

        let loaded = load(FileSource::path(&path)).await.unwrap();
        assert_eq!(loaded.upload.filename, "Photo.PNG");
        assert_eq!(loaded.upload.content_type, "image/png");

        let config = loaded.config;
        assert_eq!(config.mime_type.as_deref(), Some("image/png"));
        assert_eq!(config.extension.as_deref(), Some("png"));
        assert_eq!(config.width, Some(4));
        assert_eq!(config.height, Some(3));
        assert_eq!(config.size, Some(loaded.upload.size() as u64));
        assert!(config.hash_name.unwrap().ends_with(".png"));
    }

    #[tokio::test]
    async fn extension_falls_back_to_detected_format() {
        let loaded = load(FileSource::bytes(png_bytes(1, 1), "upload"))
            .await
            .unwrap();
        assert_eq!(loaded.config.extension.as_deref(), Some("png"));
    }

    #[tokio::test]
    async fn rejects_non_images_and_empty_input() {
        let err = load(FileSource::bytes(b"%PDF-1.7".to_vec(), "doc.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = load(FileSource::bytes(Vec::new(), "empty.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = load(FileSource::bytes(png_bytes(1, 1), "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn missing_file_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(FileSource::path(dir.path().join("nope.jpg")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
