use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::camera::{PixelPos, Viewport};
use crate::app::colors::Rgba;
use crate::app::Bitmap;

use super::raster::FrameView;

pub struct FrameRenderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl FrameRenderer {
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(viewport.width, viewport.height, surface)?;
        Ok(Self {
            window,
            pixels,
            viewport,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Err(error) = self.pixels.resize_surface(width, height) {
            warn!(error = %error, width, height, "renderer_resize_failed");
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        self.frame().clear(color);
    }

    pub fn blit(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        self.frame().blit(bitmap, x, y);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        self.frame().fill_rect(x, y, width, height, color);
    }

    pub fn present(&mut self) -> Result<(), Error> {
        self.pixels.render()
    }

    pub fn window_pos_to_pixel(&self, x: f64, y: f64) -> Option<PixelPos> {
        self.pixels
            .window_pos_to_pixel((x as f32, y as f32))
            .ok()
            .map(|(px, py)| PixelPos {
                x: px as i32,
                y: py as i32,
            })
    }

    fn frame(&mut self) -> FrameView<'_> {
        FrameView {
            pixels: self.pixels.frame_mut(),
            width: self.viewport.width,
            height: self.viewport.height,
        }
    }
}
