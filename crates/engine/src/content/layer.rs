use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::app::TileError;

use super::images::AssetError;

const INLINE_SOURCE: &str = "<inline>";

/// One tile layer as exported by common tile editors.
///
/// `data` holds 1-based palette references (`0` or negative for an empty cell) in row-major
/// order starting from the bottom-left cell. `tilesets` fixes the palette order.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDocument {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tileheight: u32,
    #[serde(default)]
    pub tilewidth: Option<u32>,
    pub data: Vec<i64>,
    pub tilesets: Vec<TilesetEntry>,
    /// Directory that relative tileset image paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TilesetEntry {
    pub image: PathBuf,
}

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("failed to read layer document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse layer document {file} at {field}: {message}")]
    Parse {
        file: PathBuf,
        field: String,
        message: String,
    },
    #[error("invalid layer document: {0}")]
    Invalid(String),
    #[error("tile image {path} rejected: {source}")]
    Tile {
        path: PathBuf,
        #[source]
        source: TileError,
    },
    #[error("failed to load tile image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: AssetError,
    },
}

impl LayerDocument {
    pub fn load(path: &Path) -> Result<Self, LayerError> {
        let raw = fs::read_to_string(path).map_err(|source| LayerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut document = Self::parse_from(&raw, path)?;
        document.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(document)
    }

    /// Parses an in-memory document. Errors name it `<inline>`.
    pub fn parse(raw: &str) -> Result<Self, LayerError> {
        Self::parse_from(raw, Path::new(INLINE_SOURCE))
    }

    fn parse_from(raw: &str, file: &Path) -> Result<Self, LayerError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let document = match serde_path_to_error::deserialize::<_, LayerDocument>(&mut deserializer)
        {
            Ok(document) => document,
            Err(error) => {
                let field = error.path().to_string();
                let message = error.into_inner().to_string();
                return Err(LayerError::Parse {
                    file: file.to_path_buf(),
                    field,
                    message,
                });
            }
        };
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<(), LayerError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayerError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.tileheight == 0 {
            return Err(LayerError::Invalid("tileheight must be positive".to_string()));
        }
        if let Some(tilewidth) = self.tilewidth {
            if tilewidth != self.tileheight {
                return Err(LayerError::Invalid(format!(
                    "tiles must be square, got tilewidth {tilewidth} and tileheight {}",
                    self.tileheight
                )));
            }
        }
        let expected = self.width as usize * self.height as usize;
        if self.data.len() != expected {
            return Err(LayerError::Invalid(format!(
                "data holds {} references, expected {expected}",
                self.data.len()
            )));
        }
        if self.tilesets.is_empty() {
            return Err(LayerError::Invalid(
                "at least one tileset image is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn image_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.tilesets
            .iter()
            .map(|tileset| self.base_dir.join(&tileset.image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TWO_BY_TWO: &str = r#"{
        "name": "ground",
        "width": 2,
        "height": 2,
        "tileheight": 8,
        "data": [1, 0, 2, 1],
        "tilesets": [{ "image": "grass.png" }]
    }"#;

    #[test]
    fn parses_minimal_document() {
        let document = LayerDocument::parse(TWO_BY_TWO).expect("parse");
        assert_eq!(document.name, "ground");
        assert_eq!((document.width, document.height), (2, 2));
        assert_eq!(document.tileheight, 8);
        assert_eq!(document.data, vec![1, 0, 2, 1]);
        assert_eq!(document.tilesets.len(), 1);
    }

    #[test]
    fn parse_error_reports_field_path() {
        let raw = r#"{"name":"g","width":"wide","height":1,"tileheight":8,"data":[1],"tilesets":[]}"#;
        match LayerDocument::parse(raw).expect_err("bad width") {
            LayerError::Parse { file, field, .. } => {
                assert_eq!(file, PathBuf::from("<inline>"));
                assert_eq!(field, "width");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_name_is_rejected() {
        let raw = r#"{"width":1,"height":1,"tileheight":8,"data":[1],"tilesets":[{"image":"a.png"}]}"#;
        assert!(matches!(
            LayerDocument::parse(raw),
            Err(LayerError::Parse { .. })
        ));
    }

    #[test]
    fn data_length_must_match_grid() {
        let raw = r#"{"name":"g","width":2,"height":2,"tileheight":8,"data":[1,1,1],"tilesets":[{"image":"a.png"}]}"#;
        assert!(matches!(
            LayerDocument::parse(raw),
            Err(LayerError::Invalid(_))
        ));
    }

    #[test]
    fn non_square_tiles_are_rejected() {
        let raw = r#"{"name":"g","width":1,"height":1,"tileheight":8,"tilewidth":16,"data":[1],"tilesets":[{"image":"a.png"}]}"#;
        assert!(matches!(
            LayerDocument::parse(raw),
            Err(LayerError::Invalid(_))
        ));
    }

    #[test]
    fn empty_palette_is_rejected() {
        let raw = r#"{"name":"g","width":1,"height":1,"tileheight":8,"data":[0],"tilesets":[]}"#;
        assert!(matches!(
            LayerDocument::parse(raw),
            Err(LayerError::Invalid(_))
        ));
    }

    #[test]
    fn load_resolves_images_against_document_dir() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("map.json");
        fs::write(&path, TWO_BY_TWO).expect("write");

        let document = LayerDocument::load(&path).expect("load");
        let paths = document.image_paths().collect::<Vec<_>>();
        assert_eq!(paths, vec![temp.path().join("grass.png")]);
    }

    #[test]
    fn load_parse_error_names_the_map_file() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("broken.json");
        fs::write(
            &path,
            r#"{"name":"g","width":"wide","height":1,"tileheight":8,"data":[1],"tilesets":[]}"#,
        )
        .expect("write");

        let err = LayerDocument::load(&path).expect_err("bad width");
        match &err {
            LayerError::Parse { file, field, .. } => {
                assert_eq!(file, &path);
                assert_eq!(field, "width");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let temp = TempDir::new().expect("temp");
        assert!(matches!(
            LayerDocument::load(&temp.path().join("absent.json")),
            Err(LayerError::Read { .. })
        ));
    }
}
