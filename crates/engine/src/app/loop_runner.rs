use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::calibration::Calibration;
use crate::serial::{open_transport, SerialConfig, SerialError};
use crate::{AppPaths, StartupError};

use super::frame::FrameDriver;
use super::game_state::GameState;
use super::input::{InputConfig, InputEvent, Key, KeyboardInput, SerialInput};
use super::metrics::MetricsAccumulator;
use super::rendering::Renderer;
use super::scene::ActiveScene;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub max_frame_delta_ms: u64,
    pub max_render_fps: Option<u32>,
    pub metrics_log_interval_ms: u64,
    /// Relative to the project root.
    pub thresholds_file: String,
    pub input: InputConfig,
    pub serial: SerialConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Calibration".to_string(),
            window_width: 640,
            window_height: 480,
            max_frame_delta_ms: 250,
            max_render_fps: Some(60),
            metrics_log_interval_ms: 1000,
            thresholds_file: "thresholds.txt".to_string(),
            input: InputConfig::default(),
            serial: SerialConfig::default(),
        }
    }
}

impl LoopConfig {
    pub fn max_frame_delta(&self) -> Duration {
        normalize_non_zero_duration(
            Duration::from_millis(self.max_frame_delta_ms),
            Duration::from_millis(250),
        )
    }

    pub fn metrics_log_interval(&self) -> Duration {
        normalize_non_zero_duration(
            Duration::from_millis(self.metrics_log_interval_ms),
            Duration::from_secs(1),
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to open serial input: {0}")]
    OpenSerial(#[source] SerialError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, paths: &AppPaths) -> Result<(), AppError> {
    let thresholds_path = paths.root.join(&config.thresholds_file);
    let max_frame_delta = config.max_frame_delta();
    let metrics_log_interval = config.metrics_log_interval();
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), paths.assets_dir.clone())
        .map_err(AppError::CreateRenderer)?;

    let transport = open_transport(&config.serial).map_err(AppError::OpenSerial)?;
    let serial = SerialInput::new(transport, &config.serial);
    let mut driver = FrameDriver::new(
        GameState::new(ActiveScene::main_menu()),
        KeyboardInput::new(&config.input),
        Some(serial),
        Calibration::new(),
        thresholds_path.clone(),
        max_frame_delta,
    );
    driver.load_startup_thresholds();

    event_loop.set_control_flow(ControlFlow::Poll);

    info!(
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        thresholds_path = %thresholds_path.display(),
        "loop_config"
    );
    info!(scene = ?driver.state().active_scene_key(), "scene_loaded");

    let mut pending_events: Vec<InputEvent> = Vec::new();
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    pending_events.push(InputEvent::QuitRequested);
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(input_event) =
                        translate_key(event.physical_key, event.state, event.repeat)
                    {
                        pending_events.push(input_event);
                    }
                }
                WindowEvent::RedrawRequested => {
                    if driver.should_exit() {
                        window_target.exit();
                        return;
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    match driver.run_frame(pending_events.drain(..), raw_frame_dt, &mut renderer) {
                        Ok(report) => {
                            if let Some(scene) = report.switched_to {
                                window.set_title(&format!(
                                    "{} - {:?}",
                                    config.window_title, scene
                                ));
                            }
                        }
                        Err(error) => {
                            warn!(error = %error, "renderer_present_failed");
                            window_target.exit();
                        }
                    }
                    last_present_instant = Instant::now();
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            slowest_frame_ms = snapshot.slowest_frame_ms,
                            scene = ?driver.state().active_scene_key(),
                            samples = driver.calibration().sample_count(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!(samples = driver.calibration().sample_count(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn map_physical_key(key: PhysicalKey) -> Option<Key> {
    match key {
        PhysicalKey::Code(KeyCode::KeyW)
        | PhysicalKey::Code(KeyCode::ArrowUp)
        | PhysicalKey::Code(KeyCode::Space) => Some(Key::W),
        PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => Some(Key::A),
        PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => Some(Key::D),
        PhysicalKey::Code(KeyCode::KeyT) => Some(Key::T),
        PhysicalKey::Code(KeyCode::Enter) | PhysicalKey::Code(KeyCode::NumpadEnter) => {
            Some(Key::Enter)
        }
        PhysicalKey::Code(KeyCode::Escape) => Some(Key::Escape),
        _ => None,
    }
}

/// OS key repeat is dropped; held keys are handled by retrigger.
fn translate_key(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<InputEvent> {
    if repeat {
        return None;
    }
    let key = map_physical_key(key)?;
    Some(match state {
        ElementState::Pressed => InputEvent::KeyDown(key),
        ElementState::Released => InputEvent::KeyUp(key),
    })
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
