use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::content::{ImageLoader, LayerDocument, LayerError};

use super::tile::Tile;

#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    name: String,
    rows: u32,
    cols: u32,
    tile_edge: u32,
    palette: Vec<Tile>,
    cells: Vec<Option<u32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("cell ({x}, {y}) is outside the {cols}x{rows} grid")]
    OutOfBounds { x: i64, y: i64, cols: u32, rows: u32 },
    #[error("grid must be at least 1x1 with a positive tile edge")]
    EmptyGrid,
    #[error("tile edge {actual} does not match grid tile edge {expected}")]
    TileEdgeMismatch { expected: u32, actual: u32 },
    #[error("cell count mismatch: expected {expected}, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("palette index {index} out of range for palette of {palette_len}")]
    PaletteIndex { index: u32, palette_len: usize },
}

/// Position of cell `(x, y)` in a bottom-up layer document's `data` array.
///
/// Row 0 of the document is the bottom row while row 0 of the grid is the top row, hence the
/// vertical flip. The trailing `- 1` is kept for compatibility with existing map files and
/// shifts every cell back by one position, so `(0, rows - 1)` maps to `-1`.
pub fn layer_index(cols: u32, rows: u32, x: u32, y: u32) -> i64 {
    x as i64 + cols as i64 * (rows as i64 - y as i64 - 1) - 1
}

impl TileMap {
    pub fn new(
        name: impl Into<String>,
        rows: u32,
        cols: u32,
        tile_edge: u32,
        palette: Vec<Tile>,
        cells: Vec<Option<u32>>,
    ) -> Result<Self, TilemapError> {
        if rows == 0 || cols == 0 || tile_edge == 0 {
            return Err(TilemapError::EmptyGrid);
        }
        let expected = rows as usize * cols as usize;
        if cells.len() != expected {
            return Err(TilemapError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        if let Some(tile) = palette.iter().find(|tile| tile.edge() != tile_edge) {
            return Err(TilemapError::TileEdgeMismatch {
                expected: tile_edge,
                actual: tile.edge(),
            });
        }
        if let Some(index) = cells
            .iter()
            .flatten()
            .copied()
            .find(|index| *index as usize >= palette.len())
        {
            return Err(TilemapError::PaletteIndex {
                index,
                palette_len: palette.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            rows,
            cols,
            tile_edge,
            palette,
            cells,
        })
    }

    pub fn filled(rows: u32, cols: u32, tile: Tile) -> Result<Self, TilemapError> {
        let cells = vec![Some(0); rows as usize * cols as usize];
        let tile_edge = tile.edge();
        Self::new("filled", rows, cols, tile_edge, vec![tile], cells)
    }

    pub fn load_layer_file(path: &Path, loader: &dyn ImageLoader) -> Result<Self, LayerError> {
        let document = LayerDocument::load(path)?;
        Self::from_layer(&document, loader)
    }

    pub fn from_layer(
        document: &LayerDocument,
        loader: &dyn ImageLoader,
    ) -> Result<Self, LayerError> {
        let tile_edge = document.tileheight;
        let mut palette = Vec::with_capacity(document.tilesets.len());
        for path in document.image_paths() {
            let tile = match loader.decode_image(&path) {
                Ok(bitmap) => Tile::create(bitmap, tile_edge)
                    .map_err(|source| LayerError::Tile { path, source })?,
                Err(error) if error.is_not_found() => {
                    warn!(
                        layer = %document.name,
                        path = %path.display(),
                        "tile_image_missing_using_placeholder"
                    );
                    Tile::placeholder(tile_edge)
                }
                Err(source) => return Err(LayerError::Image { path, source }),
            };
            palette.push(tile);
        }

        let rows = document.height;
        let cols = document.width;
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        let mut unknown_references = 0usize;
        for y in 0..rows {
            for x in 0..cols {
                let reference = usize::try_from(layer_index(cols, rows, x, y))
                    .ok()
                    .and_then(|raw_index| document.data.get(raw_index))
                    .copied()
                    .unwrap_or(0);
                let cell = palette_index(reference, palette.len());
                if reference > 0 && cell.is_none() {
                    unknown_references += 1;
                }
                cells.push(cell);
            }
        }
        if unknown_references > 0 {
            warn!(
                layer = %document.name,
                unknown_references,
                palette_len = palette.len(),
                "layer_references_past_palette_treated_as_empty"
            );
        }

        let tilemap = Self::new(document.name.clone(), rows, cols, tile_edge, palette, cells)
            .map_err(|error| LayerError::Invalid(error.to_string()))?;
        info!(
            layer = %tilemap.name,
            rows,
            cols,
            tile_edge,
            palette_len = tilemap.palette.len(),
            "layer_loaded"
        );
        Ok(tilemap)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn tile_edge(&self) -> u32 {
        self.tile_edge
    }

    pub fn palette(&self) -> &[Tile] {
        &self.palette
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.cols.saturating_mul(self.tile_edge),
            self.rows.saturating_mul(self.tile_edge),
        )
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.cols as i64 && y < self.rows as i64
    }

    pub fn index_of(&self, x: u32, y: u32) -> i64 {
        layer_index(self.cols, self.rows, x, y)
    }

    pub fn tile_at(&self, x: i64, y: i64) -> Result<Option<&Tile>, TilemapError> {
        let index = self.storage_index(x, y)?;
        Ok(self.cells[index].map(|palette_index| &self.palette[palette_index as usize]))
    }

    pub fn fill(&mut self, tile: Tile) -> Result<(), TilemapError> {
        if tile.edge() != self.tile_edge {
            return Err(TilemapError::TileEdgeMismatch {
                expected: self.tile_edge,
                actual: tile.edge(),
            });
        }
        self.palette = vec![tile];
        self.cells.iter_mut().for_each(|cell| *cell = Some(0));
        Ok(())
    }

    fn storage_index(&self, x: i64, y: i64) -> Result<usize, TilemapError> {
        if !self.contains(x, y) {
            return Err(TilemapError::OutOfBounds {
                x,
                y,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(y as usize * self.cols as usize + x as usize)
    }
}

fn palette_index(reference: i64, palette_len: usize) -> Option<u32> {
    if reference <= 0 {
        return None;
    }
    let index = u32::try_from(reference - 1).ok()?;
    ((index as usize) < palette_len).then_some(index)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use super::*;
    use crate::app::colors::{BLUE, GREEN, RED};
    use crate::app::Bitmap;
    use crate::content::AssetError;

    struct StubLoader {
        images: Vec<(PathBuf, Bitmap)>,
        requested: RefCell<Vec<PathBuf>>,
    }

    impl StubLoader {
        fn new(images: Vec<(&str, Bitmap)>) -> Self {
            Self {
                images: images
                    .into_iter()
                    .map(|(path, bitmap)| (PathBuf::from(path), bitmap))
                    .collect(),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl ImageLoader for StubLoader {
        fn decode_image(&self, path: &Path) -> Result<Bitmap, AssetError> {
            self.requested.borrow_mut().push(path.to_path_buf());
            self.images
                .iter()
                .find(|(candidate, _)| candidate == path)
                .map(|(_, bitmap)| bitmap.clone())
                .ok_or_else(|| AssetError::NotFound(path.to_path_buf()))
        }
    }

    fn solid_tile(edge: u32, color: [u8; 4]) -> Tile {
        Tile::create(Bitmap::solid(edge, edge, color), edge).expect("tile")
    }

    fn layer(width: u32, height: u32, data: Vec<i64>, images: &[&str]) -> LayerDocument {
        let tilesets = images
            .iter()
            .map(|image| format!(r#"{{"image":"{image}"}}"#))
            .collect::<Vec<_>>()
            .join(",");
        let raw = format!(
            r#"{{"name":"test","width":{width},"height":{height},"tileheight":8,"data":{data:?},"tilesets":[{tilesets}]}}"#
        );
        LayerDocument::parse(&raw).expect("layer")
    }

    #[test]
    fn filled_grid_returns_tile_everywhere_and_rejects_outside() {
        for (rows, cols) in [(1, 1), (3, 5), (7, 2)] {
            let tile = solid_tile(4, RED);
            let tilemap = TileMap::filled(rows, cols, tile.clone()).expect("tilemap");
            for y in 0..rows as i64 {
                for x in 0..cols as i64 {
                    assert_eq!(tilemap.tile_at(x, y).expect("in range"), Some(&tile));
                }
            }
            for (x, y) in [(-1, 0), (0, -1), (cols as i64, 0), (0, rows as i64)] {
                assert_eq!(
                    tilemap.tile_at(x, y),
                    Err(TilemapError::OutOfBounds { x, y, cols, rows })
                );
            }
        }
    }

    #[test]
    fn fill_replaces_every_cell_and_palette() {
        let mut tilemap = TileMap::new(
            "mixed",
            2,
            2,
            4,
            vec![solid_tile(4, RED), solid_tile(4, GREEN)],
            vec![Some(0), None, Some(1), None],
        )
        .expect("tilemap");
        let blue = solid_tile(4, BLUE);

        tilemap.fill(blue.clone()).expect("fill");

        assert_eq!(tilemap.palette(), &[blue.clone()]);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(tilemap.tile_at(x, y).expect("in range"), Some(&blue));
        }
    }

    #[test]
    fn fill_rejects_tile_of_other_edge() {
        let mut tilemap = TileMap::filled(2, 2, solid_tile(4, RED)).expect("tilemap");
        assert_eq!(
            tilemap.fill(solid_tile(8, RED)),
            Err(TilemapError::TileEdgeMismatch {
                expected: 4,
                actual: 8
            })
        );
    }

    #[test]
    fn new_validates_cells_and_palette() {
        assert_eq!(
            TileMap::new("t", 0, 2, 4, Vec::new(), Vec::new()),
            Err(TilemapError::EmptyGrid)
        );
        assert_eq!(
            TileMap::new("t", 2, 2, 4, vec![solid_tile(4, RED)], vec![Some(0); 3]),
            Err(TilemapError::CellCountMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            TileMap::new("t", 1, 1, 4, vec![solid_tile(4, RED)], vec![Some(1)]),
            Err(TilemapError::PaletteIndex {
                index: 1,
                palette_len: 1
            })
        );
    }

    #[test]
    fn layer_index_is_a_bijection_onto_contiguous_range() {
        for (rows, cols) in [(1, 1), (2, 2), (3, 4), (5, 1)] {
            let mut seen = HashSet::new();
            for y in 0..rows {
                for x in 0..cols {
                    assert!(seen.insert(layer_index(cols, rows, x, y)));
                }
            }
            let count = rows as i64 * cols as i64;
            let expected = (-1..count - 1).collect::<HashSet<_>>();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn layer_index_flips_rows() {
        assert_eq!(layer_index(3, 2, 0, 0), 2);
        assert_eq!(layer_index(3, 2, 2, 0), 4);
        assert_eq!(layer_index(3, 2, 1, 1), 0);
        assert_eq!(layer_index(3, 2, 0, 1), -1);
    }

    #[test]
    fn from_layer_two_by_two_follows_flip_transform() {
        let document = layer(2, 2, vec![1, 0, 2, 1], &["grass.png"]);
        let loader = StubLoader::new(vec![("grass.png", Bitmap::solid(8, 8, GREEN))]);

        let tilemap = TileMap::from_layer(&document, &loader).expect("tilemap");
        let grass = solid_tile(8, GREEN);

        assert_eq!((tilemap.rows(), tilemap.cols(), tilemap.tile_edge()), (2, 2, 8));
        assert_eq!(tilemap.index_of(0, 0), 1);
        assert_eq!(tilemap.index_of(1, 0), 2);
        assert_eq!(tilemap.index_of(0, 1), -1);
        assert_eq!(tilemap.index_of(1, 1), 0);
        // data[1] = 0 is empty.
        assert_eq!(tilemap.tile_at(0, 0).expect("in range"), None);
        // data[2] = 2 names a second palette entry that does not exist.
        assert_eq!(tilemap.tile_at(1, 0).expect("in range"), None);
        // No document position backs index -1.
        assert_eq!(tilemap.tile_at(0, 1).expect("in range"), None);
        // data[0] = 1 is the grass tile.
        assert_eq!(tilemap.tile_at(1, 1).expect("in range"), Some(&grass));
    }

    #[test]
    fn from_layer_reads_back_each_cell_from_its_document_position() {
        let document = layer(3, 2, vec![1, 2, 1, 2, 1, 2], &["a.png", "b.png"]);
        let loader = StubLoader::new(vec![
            ("a.png", Bitmap::solid(8, 8, RED)),
            ("b.png", Bitmap::solid(8, 8, BLUE)),
        ]);
        let tilemap = TileMap::from_layer(&document, &loader).expect("tilemap");

        for y in 0..2u32 {
            for x in 0..3u32 {
                let raw = tilemap.index_of(x, y);
                let expected = usize::try_from(raw)
                    .ok()
                    .map(|index| &tilemap.palette()[(document.data[index] - 1) as usize]);
                assert_eq!(
                    tilemap.tile_at(x as i64, y as i64).expect("in range"),
                    expected,
                    "cell ({x}, {y}) raw index {raw}"
                );
            }
        }
    }

    #[test]
    fn from_layer_substitutes_placeholder_for_missing_image() {
        let document = layer(1, 1, vec![1], &["missing.png"]);
        let loader = StubLoader::new(Vec::new());

        let tilemap = TileMap::from_layer(&document, &loader).expect("tilemap");

        assert_eq!(tilemap.palette(), &[Tile::placeholder(8)]);
        assert_eq!(
            loader.requested.borrow().as_slice(),
            &[PathBuf::from("missing.png")]
        );
    }

    #[test]
    fn from_layer_rejects_wrong_tile_size() {
        let document = layer(1, 1, vec![1], &["big.png"]);
        let loader = StubLoader::new(vec![("big.png", Bitmap::solid(16, 16, RED))]);

        match TileMap::from_layer(&document, &loader).expect_err("size mismatch") {
            LayerError::Tile { path, .. } => assert_eq!(path, PathBuf::from("big.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_references_are_empty() {
        assert_eq!(palette_index(-3, 2), None);
        assert_eq!(palette_index(0, 2), None);
        assert_eq!(palette_index(2, 2), Some(1));
        assert_eq!(palette_index(3, 2), None);
    }

    #[test]
    fn pixel_size_and_contains() {
        let tilemap = TileMap::filled(3, 5, solid_tile(10, RED)).expect("tilemap");
        assert_eq!(tilemap.pixel_size(), (50, 30));
        assert!(tilemap.contains(4, 2));
        assert!(!tilemap.contains(5, 2));
        assert!(!tilemap.contains(-1, 0));
    }

    #[test]
    fn shipped_demo_map_loads_from_disk() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/maps/demo.json");
        let tilemap =
            TileMap::load_layer_file(&path, &crate::content::DiskImageLoader).expect("demo map");

        assert_eq!((tilemap.cols(), tilemap.rows()), (30, 24));
        assert_eq!(tilemap.tile_edge(), 32);
        assert_eq!(tilemap.palette().len(), 4);
        assert!(tilemap.tile_at(29, 23).expect("in bounds").is_some());
    }
}
