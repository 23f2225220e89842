use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;

pub use app::{
    colors, layer_index, Bitmap, Camera, DesktopHost, Direction, DirectionStates, Host, HostError,
    HostEvent, LoopState, PixelPos, Tile, TileError, TileMap, TilemapError, Viewport, WorldConfig,
    WorldLoop, FPS_ENV_VAR, SCROLL_SPEED_ENV_VAR,
};
pub use content::{
    AssetError, AudioClip, DiskImageLoader, ImageLoader, LayerDocument, LayerError, TilesetEntry,
};

pub const ROOT_ENV_VAR: &str = "TILER_ROOT";
pub const DEFAULT_MAP_FILE: &str = "demo.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub maps_dir: PathBuf,
}

impl AppPaths {
    fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        let maps_dir = assets_dir.join("maps");
        Self {
            root,
            assets_dir,
            maps_dir,
        }
    }

    pub fn default_map_path(&self) -> PathBuf {
        self.maps_dir.join(DEFAULT_MAP_FILE)
    }

    pub fn icon_path(&self) -> PathBuf {
        self.assets_dir.join("icon.png")
    }

    pub fn music_path(&self) -> PathBuf {
        self.assets_dir.join("audio").join("theme.wav")
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "TILER_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/tiler\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
