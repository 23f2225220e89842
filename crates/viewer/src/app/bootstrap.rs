use std::ffi::OsString;
use std::path::PathBuf;

use engine::colors::GREEN;
use engine::{
    resolve_app_paths, AppPaths, Bitmap, DiskImageLoader, Tile, TileMap, WorldConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::AppError;

const FALLBACK_GRID_CELLS: u32 = 20;
const FALLBACK_TILE_EDGE_PX: u32 = 32;

pub(crate) struct AppWiring {
    pub(crate) config: WorldConfig,
    pub(crate) tilemap: TileMap,
}

pub(crate) fn build_app(map_arg: Option<OsString>) -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Tiler Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "asset_root_resolved");

    let config = WorldConfig {
        icon_path: Some(paths.icon_path()),
        music_path: Some(paths.music_path()),
        ..WorldConfig::default()
    }
    .with_env_overrides();

    let tilemap = load_tilemap(map_arg, &paths)?;
    Ok(AppWiring { config, tilemap })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_tilemap(map_arg: Option<OsString>, paths: &AppPaths) -> Result<TileMap, AppError> {
    let (path, explicit) = select_map_path(map_arg, paths);
    if !explicit && !path.is_file() {
        warn!(path = %path.display(), "default_map_missing; using filled grid");
        return fallback_tilemap();
    }
    Ok(TileMap::load_layer_file(&path, &DiskImageLoader)?)
}

/// Returns the map to load and whether the caller named it.
fn select_map_path(map_arg: Option<OsString>, paths: &AppPaths) -> (PathBuf, bool) {
    match map_arg {
        Some(arg) => (PathBuf::from(arg), true),
        None => (paths.default_map_path(), false),
    }
}

fn fallback_tilemap() -> Result<TileMap, AppError> {
    let tile = Tile::create(
        Bitmap::solid(FALLBACK_TILE_EDGE_PX, FALLBACK_TILE_EDGE_PX, GREEN),
        FALLBACK_TILE_EDGE_PX,
    )?;
    Ok(TileMap::filled(
        FALLBACK_GRID_CELLS,
        FALLBACK_GRID_CELLS,
        tile,
    )?)
}
