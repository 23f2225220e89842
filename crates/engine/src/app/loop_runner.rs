use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::content::ImageLoader;

use super::camera::{Camera, PixelPos, Viewport};
use super::colors::{self, Rgba};
use super::host::{Host, HostEvent};
use super::metrics::MetricsAccumulator;
use super::tile::Tile;
use super::tilemap::TileMap;

pub const FPS_ENV_VAR: &str = "TILER_FPS";
pub const SCROLL_SPEED_ENV_VAR: &str = "TILER_SCROLL_SPEED";
pub const ICON_EDGE_PX: u32 = 32;

#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub window_title: String,
    pub viewport: Viewport,
    pub target_fps: u32,
    pub scroll_speed: u32,
    pub background_color: Rgba,
    pub music_path: Option<PathBuf>,
    pub icon_path: Option<PathBuf>,
    pub highlight_pointer: bool,
    pub metrics_log_interval: Duration,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            window_title: "Tiler".to_string(),
            viewport: Viewport {
                width: 500,
                height: 500,
            },
            target_fps: 30,
            scroll_speed: 10,
            background_color: colors::BLACK,
            music_path: None,
            icon_path: None,
            highlight_pointer: true,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

impl WorldConfig {
    pub fn with_env_overrides(mut self) -> Self {
        self.target_fps =
            resolve_u32_override(FPS_ENV_VAR, env::var(FPS_ENV_VAR), self.target_fps);
        self.scroll_speed = resolve_u32_override(
            SCROLL_SPEED_ENV_VAR,
            env::var(SCROLL_SPEED_ENV_VAR),
            self.scroll_speed,
        );
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

pub struct WorldLoop<H: Host> {
    host: H,
    tilemap: TileMap,
    camera: Camera,
    config: WorldConfig,
    state: LoopState,
    metrics: MetricsAccumulator,
    last_frame_instant: Instant,
    picked_cell: Option<(u32, u32)>,
}

impl<H: Host> WorldLoop<H> {
    pub fn new(
        mut host: H,
        tilemap: TileMap,
        config: WorldConfig,
        images: &dyn ImageLoader,
    ) -> Self {
        let camera = Camera::new(config.viewport, tilemap.pixel_size(), tilemap.tile_edge());
        let (world_width, world_height) = tilemap.pixel_size();
        info!(
            layer = tilemap.name(),
            viewport_width = config.viewport.width,
            viewport_height = config.viewport.height,
            world_width,
            world_height,
            cols = tilemap.cols(),
            rows = tilemap.rows(),
            tile_edge = tilemap.tile_edge(),
            "world_initialized"
        );

        host.set_window_title(&config.window_title);
        info!(title = %config.window_title, "title_set");
        if let Some(path) = &config.icon_path {
            apply_icon(&mut host, images, path);
        }
        if let Some(path) = &config.music_path {
            match host.play_looping_audio(path) {
                Ok(()) => info!(path = %path.display(), "background_music_started"),
                Err(error) => warn!(
                    path = %path.display(),
                    error = %error,
                    "background_music_skipped"
                ),
            }
        }

        let metrics = MetricsAccumulator::new(normalize_non_zero_duration(
            config.metrics_log_interval,
            Duration::from_secs(1),
        ));
        Self {
            host,
            tilemap,
            camera,
            config,
            state: LoopState::Running,
            metrics,
            last_frame_instant: Instant::now(),
            picked_cell: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tilemap(&self) -> &TileMap {
        &self.tilemap
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn picked_cell(&self) -> Option<(u32, u32)> {
        self.picked_cell
    }

    pub fn run(&mut self) {
        info!(
            target_fps = self.config.target_fps.max(1),
            scroll_speed = self.config.scroll_speed,
            "loop_started"
        );
        while self.state == LoopState::Running {
            self.step();
        }
    }

    pub fn step(&mut self) -> LoopState {
        if self.state == LoopState::Terminated {
            return self.state;
        }

        for event in self.host.poll_events() {
            match event {
                HostEvent::Quit => {
                    info!(reason = "quit_event", "shutdown_requested");
                    self.terminate();
                    return self.state;
                }
                HostEvent::PointerDown(position) => self.report_picked_cell(position),
                HostEvent::Other => {}
            }
        }

        if let Some(direction) = self.host.key_state().dominant() {
            self.camera.move_by(direction, self.config.scroll_speed);
        }

        self.draw_frame();
        if let Err(error) = self.host.present() {
            warn!(error = %error, "present_failed");
            self.terminate();
            return self.state;
        }
        self.host.sleep_until_next_tick(self.config.target_fps.max(1));
        self.record_frame();
        self.state
    }

    fn draw_frame(&mut self) {
        self.host.clear(self.config.background_color);

        for y in 0..self.tilemap.rows() {
            for x in 0..self.tilemap.cols() {
                if let Ok(Some(tile)) = self.tilemap.tile_at(x as i64, y as i64) {
                    let position = self.camera.cell_to_pixel(x, y);
                    self.host.blit(tile.image(), position.x, position.y);
                }
            }
        }

        if !self.config.highlight_pointer {
            return;
        }
        let Some(pointer) = self.host.pointer_position() else {
            return;
        };
        let (cell_x, cell_y) = self.camera.pixel_to_cell(pointer);
        if !self.tilemap.contains(cell_x, cell_y) {
            return;
        }
        let top_left = self.camera.cell_to_pixel(cell_x as u32, cell_y as u32);
        let edge = self.tilemap.tile_edge();
        self.host
            .fill_rect(top_left.x, top_left.y, edge, edge, colors::HIGHLIGHT);
    }

    fn report_picked_cell(&mut self, position: PixelPos) {
        let (x, y) = self.camera.pixel_to_cell(position);
        if self.tilemap.contains(x, y) {
            info!(x, y, "cell_picked");
            self.picked_cell = Some((x as u32, y as u32));
        } else {
            debug!(x, y, "pointer_outside_grid");
        }
    }

    fn record_frame(&mut self) {
        let now = Instant::now();
        let frame_dt = now.saturating_duration_since(self.last_frame_instant);
        self.last_frame_instant = now;
        self.metrics.record_frame(frame_dt);
        if let Some(snapshot) = self.metrics.maybe_snapshot(now) {
            let offset = self.camera.offset();
            info!(
                fps = snapshot.fps,
                frame_time_ms = snapshot.frame_time_ms,
                offset_x = offset.x,
                offset_y = offset.y,
                "loop_metrics"
            );
        }
    }

    fn terminate(&mut self) {
        if self.state == LoopState::Terminated {
            return;
        }
        self.state = LoopState::Terminated;
        self.host.release();
        info!("shutdown");
    }
}

fn apply_icon<H: Host>(host: &mut H, images: &dyn ImageLoader, path: &std::path::Path) {
    let bitmap = match images.decode_image(path) {
        Ok(bitmap) => bitmap,
        Err(error) => {
            warn!(path = %path.display(), error = %error, "icon_skipped");
            return;
        }
    };
    match Tile::create(bitmap, ICON_EDGE_PX) {
        Ok(tile) => {
            let keyed = tile.image().clone().with_color_key(colors::ICON_COLOR_KEY);
            host.set_window_icon(&keyed);
            info!(path = %path.display(), "icon_set");
        }
        Err(error) => warn!(path = %path.display(), error = %error, "icon_skipped"),
    }
}

pub(crate) fn resolve_u32_override(
    var: &'static str,
    value: Result<String, env::VarError>,
    fallback: u32,
) -> u32 {
    match value {
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(parsed) if parsed > 0 => parsed,
            _ => {
                warn!(
                    env_var = var,
                    value = raw.as_str(),
                    "invalid env var value; falling back to config"
                );
                fallback
            }
        },
        Err(env::VarError::NotPresent) => fallback,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read env var; falling back to config"
            );
            fallback
        }
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

pub(crate) fn target_frame_duration(target_fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / target_fps.max(1) as f64)
}

pub(crate) fn compute_cap_sleep(elapsed: Duration, target: Duration) -> Duration {
    target.saturating_sub(elapsed)
}
