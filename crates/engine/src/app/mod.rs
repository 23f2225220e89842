mod audio;
mod camera;
pub mod colors;
mod desktop;
mod host;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod tile;
mod tilemap;

pub use audio::LoopingAudio;
pub use camera::{Camera, PixelPos, Viewport};
pub use desktop::DesktopHost;
pub use host::{Host, HostError, HostEvent};
pub use input::{Direction, DirectionStates, DIRECTION_PRECEDENCE};
pub use loop_runner::{
    LoopState, WorldConfig, WorldLoop, FPS_ENV_VAR, ICON_EDGE_PX, SCROLL_SPEED_ENV_VAR,
};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::FrameRenderer;
pub use tile::{Bitmap, Tile, TileError};
pub use tilemap::{layer_index, TileMap, TilemapError};
