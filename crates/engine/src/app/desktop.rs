use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Icon, WindowBuilder};

use crate::content::{AssetError, AudioClip};

use super::audio::LoopingAudio;
use super::camera::{PixelPos, Viewport};
use super::colors::Rgba;
use super::host::{Host, HostError, HostEvent};
use super::input::{Direction, DirectionStates};
use super::loop_runner::{compute_cap_sleep, target_frame_duration};
use super::rendering::FrameRenderer;
use super::tile::Bitmap;

pub struct DesktopHost {
    event_loop: EventLoop<()>,
    renderer: Option<FrameRenderer>,
    input: InputCollector,
    pacer: FramePacer,
    audio: Option<LoopingAudio>,
}

impl DesktopHost {
    pub fn init(title: &str, viewport: Viewport) -> Result<Self, HostError> {
        let event_loop = EventLoop::new().map_err(HostError::CreateEventLoop)?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(LogicalSize::new(
                    viewport.width as f64,
                    viewport.height as f64,
                ))
                .build(&event_loop)
                .map_err(HostError::CreateWindow)?,
        );
        let renderer = FrameRenderer::new(window, viewport).map_err(HostError::CreateRenderer)?;
        info!(
            width = viewport.width,
            height = viewport.height,
            "display_created"
        );
        Ok(Self {
            event_loop,
            renderer: Some(renderer),
            input: InputCollector::default(),
            pacer: FramePacer::default(),
            audio: None,
        })
    }
}

impl Host for DesktopHost {
    fn poll_events(&mut self) -> Vec<HostEvent> {
        let Some(renderer) = self.renderer.as_mut() else {
            return vec![HostEvent::Quit];
        };
        let window_id = renderer.window().id();
        let input = &mut self.input;
        let mut events = Vec::new();

        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _window_target| {
                let Event::WindowEvent {
                    window_id: event_window_id,
                    event,
                } = event
                else {
                    return;
                };
                if event_window_id != window_id {
                    return;
                }
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        events.push(HostEvent::Quit);
                    }
                    WindowEvent::Resized(size) => {
                        renderer.resize_surface(size.width, size.height);
                        events.push(HostEvent::Other);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input.set_cursor_position(
                            renderer.window_pos_to_pixel(position.x, position.y),
                        );
                    }
                    WindowEvent::CursorLeft { .. } => input.set_cursor_position(None),
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        if let Some(position) = input.cursor_position {
                            events.push(HostEvent::PointerDown(position));
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let is_pressed = event.state == ElementState::Pressed;
                        if input.handle_physical_key(event.physical_key, is_pressed) {
                            info!(reason = "escape_key", "shutdown_requested");
                            events.push(HostEvent::Quit);
                        }
                    }
                    _ => events.push(HostEvent::Other),
                }
            });

        if let PumpStatus::Exit(code) = status {
            info!(code, reason = "event_loop_exit", "shutdown_requested");
            events.push(HostEvent::Quit);
        }
        events
    }

    fn key_state(&self) -> DirectionStates {
        self.input.directions
    }

    fn pointer_position(&self) -> Option<PixelPos> {
        self.input.cursor_position
    }

    fn clear(&mut self, color: Rgba) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.clear(color);
        }
    }

    fn blit(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.blit(bitmap, x, y);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.fill_rect(x, y, width, height, color);
        }
    }

    fn present(&mut self) -> Result<(), HostError> {
        let renderer = self.renderer.as_mut().ok_or(HostError::Released)?;
        renderer.present().map_err(HostError::Present)
    }

    fn set_window_title(&mut self, title: &str) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().set_title(title);
        }
    }

    fn set_window_icon(&mut self, icon: &Bitmap) {
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        match Icon::from_rgba(icon.rgba().to_vec(), icon.width(), icon.height()) {
            Ok(icon) => renderer.window().set_window_icon(Some(icon)),
            Err(error) => warn!(error = %error, "window_icon_rejected"),
        }
    }

    fn play_looping_audio(&mut self, path: &Path) -> Result<(), AssetError> {
        let clip = AudioClip::load(path)?;
        self.audio = Some(LoopingAudio::start(clip)?);
        Ok(())
    }

    fn sleep_until_next_tick(&mut self, target_fps: u32) {
        self.pacer.wait(target_fps);
    }

    fn release(&mut self) {
        self.audio = None;
        if let Some(renderer) = self.renderer.take() {
            renderer.window().set_visible(false);
            info!("display_released");
        }
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    directions: DirectionStates,
    cursor_position: Option<PixelPos>,
}

impl InputCollector {
    /// Tracks held scroll keys. Returns true for a quit key press.
    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) -> bool {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.directions.set(Direction::Up, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.directions.set(Direction::Down, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.directions.set(Direction::Left, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.directions.set(Direction::Right, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) => return is_pressed,
            _ => {}
        }
        false
    }

    fn set_cursor_position(&mut self, position: Option<PixelPos>) {
        self.cursor_position = position;
    }
}

#[derive(Debug, Default)]
struct FramePacer {
    last_tick: Option<Instant>,
}

impl FramePacer {
    fn wait(&mut self, target_fps: u32) {
        if let Some(last_tick) = self.last_tick {
            let sleep = compute_cap_sleep(last_tick.elapsed(), target_frame_duration(target_fps));
            if sleep > Duration::ZERO {
                thread::sleep(sleep);
            }
        }
        self.last_tick = Some(Instant::now());
    }
}
