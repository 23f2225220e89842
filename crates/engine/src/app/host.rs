use std::path::Path;

use thiserror::Error;

use crate::content::AssetError;

use super::camera::PixelPos;
use super::colors::Rgba;
use super::input::DirectionStates;
use super::tile::Bitmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Quit,
    PointerDown(PixelPos),
    Other,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] winit::error::EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] winit::error::OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] pixels::Error),
    #[error("failed to present frame: {0}")]
    Present(#[source] pixels::Error),
    #[error("display already released")]
    Released,
}

pub trait Host {
    /// Drains every pending event without blocking.
    fn poll_events(&mut self) -> Vec<HostEvent>;
    fn key_state(&self) -> DirectionStates;
    fn pointer_position(&self) -> Option<PixelPos>;

    fn clear(&mut self, color: Rgba);
    fn blit(&mut self, bitmap: &Bitmap, x: i32, y: i32);
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba);
    fn present(&mut self) -> Result<(), HostError>;

    fn set_window_title(&mut self, title: &str);
    fn set_window_icon(&mut self, icon: &Bitmap);
    fn play_looping_audio(&mut self, path: &Path) -> Result<(), AssetError>;

    fn sleep_until_next_tick(&mut self, target_fps: u32);

    fn release(&mut self);
}
