mod bootstrap;
mod loop_runner;

use engine::{HostError, LayerError, StartupError, TileError, TilemapError};
use thiserror::Error;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load map: {0}")]
    Layer(#[from] LayerError),
    #[error("failed to build tile: {0}")]
    Tile(#[from] TileError),
    #[error("failed to build map: {0}")]
    Tilemap(#[from] TilemapError),
    #[error(transparent)]
    Host(#[from] HostError),
}
