use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

use crate::app::Bitmap;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported audio file {path}: {reason}")]
    UnsupportedAudio { path: PathBuf, reason: String },
    #[error("audio output unavailable: {0}")]
    AudioOutput(String),
}

impl AssetError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound(_))
    }
}

/// Source of decoded tile and icon bitmaps.
pub trait ImageLoader {
    fn decode_image(&self, path: &Path) -> Result<Bitmap, AssetError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskImageLoader;

impl ImageLoader for DiskImageLoader {
    fn decode_image(&self, path: &Path) -> Result<Bitmap, AssetError> {
        let reader = ImageReader::open(path).map_err(|source| open_error(path, source))?;
        let reader = reader
            .with_guessed_format()
            .map_err(|source| open_error(path, source))?;
        let decoded = reader.decode().map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Bitmap::from(decoded.to_rgba8()))
    }
}

pub(crate) fn open_error(path: &Path, source: io::Error) -> AssetError {
    if source.kind() == io::ErrorKind::NotFound {
        AssetError::NotFound(path.to_path_buf())
    } else {
        AssetError::Open {
            path: path.to_path_buf(),
            source,
        }
    }
}
