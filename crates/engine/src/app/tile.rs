use std::sync::Arc;

use thiserror::Error;

use super::colors::Rgba;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Bitmap {
    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn with_color_key(mut self, key: [u8; 3]) -> Self {
        for pixel in self.rgba.chunks_exact_mut(4) {
            if pixel[..3] == key {
                pixel[3] = 0;
            }
        }
        self
    }
}

impl From<image::RgbaImage> for Bitmap {
    fn from(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            rgba: image.into_raw(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("tile image is {width}x{height}, expected {edge}x{edge}")]
    SizeMismatch { edge: u32, width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    image: Arc<Bitmap>,
    edge: u32,
}

impl Tile {
    pub fn create(image: Bitmap, edge: u32) -> Result<Self, TileError> {
        if image.dimensions() != (edge, edge) {
            return Err(TileError::SizeMismatch {
                edge,
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self {
            image: Arc::new(image),
            edge,
        })
    }

    pub fn placeholder(edge: u32) -> Self {
        Self {
            image: Arc::new(Bitmap::solid(edge, edge, super::colors::BLACK)),
            edge,
        }
    }

    pub fn image(&self) -> &Bitmap {
        &self.image
    }

    pub fn edge(&self) -> u32 {
        self.edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::colors::{GREEN, RED};

    #[test]
    fn create_accepts_matching_square_image() {
        let tile = Tile::create(Bitmap::solid(16, 16, RED), 16).expect("tile");
        assert_eq!(tile.edge(), 16);
        assert_eq!(tile.image().dimensions(), (16, 16));
    }

    #[test]
    fn create_rejects_wrong_size() {
        let err = Tile::create(Bitmap::solid(16, 8, RED), 16).expect_err("mismatch");
        assert_eq!(
            err,
            TileError::SizeMismatch {
                edge: 16,
                width: 16,
                height: 8
            }
        );
    }

    #[test]
    fn placeholder_has_required_edge() {
        let tile = Tile::placeholder(12);
        assert_eq!(tile.image().dimensions(), (12, 12));
        assert_eq!(&tile.image().rgba()[..4], &crate::app::colors::BLACK);
    }

    #[test]
    fn converts_decoded_rgba_image() {
        let mut image = image::RgbaImage::from_pixel(3, 2, image::Rgba(GREEN));
        image.put_pixel(2, 1, image::Rgba(RED));

        let bitmap = Bitmap::from(image);

        assert_eq!(bitmap.dimensions(), (3, 2));
        assert_eq!(bitmap.rgba().len(), 3 * 2 * 4);
        assert_eq!(&bitmap.rgba()[20..24], &RED);
    }

    #[test]
    fn color_key_clears_alpha_of_matching_pixels_only() {
        let mut image = image::RgbaImage::from_pixel(2, 1, image::Rgba(GREEN));
        image.put_pixel(0, 0, image::Rgba([100, 100, 100, 255]));
        let keyed = Bitmap::from(image).with_color_key([100, 100, 100]);
        assert_eq!(keyed.rgba()[3], 0);
        assert_eq!(keyed.rgba()[7], 255);
    }
}
