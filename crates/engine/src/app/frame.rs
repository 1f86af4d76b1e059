use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::calibration::{load_thresholds, Calibration, Channel};

use super::game_state::GameState;
use super::input::{InputEvent, KeyboardInput, SerialFrame, SerialInput};
use super::rendering::{RenderError, RenderSurface};
use super::scene::SceneKey;

/// What happened during one [`FrameDriver::run_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub delta_seconds: f32,
    pub rendered_scene: SceneKey,
    pub switched_to: Option<SceneKey>,
    pub serial_frame: Option<SerialFrame>,
    pub thresholds_written: bool,
}

/// Owns every per-session object and runs them in the fixed frame order:
/// retrigger, events, serial poll, update, render, scene switch, present.
pub struct FrameDriver {
    state: GameState,
    keyboard: KeyboardInput,
    serial: Option<SerialInput>,
    calibration: Calibration,
    thresholds_path: PathBuf,
    max_frame_delta: Duration,
}

impl FrameDriver {
    pub fn new(
        state: GameState,
        keyboard: KeyboardInput,
        serial: Option<SerialInput>,
        calibration: Calibration,
        thresholds_path: PathBuf,
        max_frame_delta: Duration,
    ) -> Self {
        Self {
            state,
            keyboard,
            serial,
            calibration,
            thresholds_path,
            max_frame_delta,
        }
    }

    /// Applies a previously written thresholds file to the serial channels.
    /// A missing file keeps the configured defaults.
    pub fn load_startup_thresholds(&mut self) {
        let Some(serial) = self.serial.as_mut() else {
            return;
        };
        match load_thresholds(&self.thresholds_path) {
            Ok(Some(stats)) => {
                serial.apply_thresholds(&stats);
                info!(
                    path = %self.thresholds_path.display(),
                    myo1 = serial.threshold(Channel::Myo1),
                    myo2 = serial.threshold(Channel::Myo2),
                    eeg = serial.threshold(Channel::Eeg),
                    "thresholds_loaded"
                );
            }
            Ok(None) => {
                info!(path = %self.thresholds_path.display(), "thresholds_file_absent");
            }
            Err(error) => {
                warn!(error = %error, "thresholds_load_failed");
            }
        }
    }

    pub fn run_frame<I>(
        &mut self,
        events: I,
        frame_dt: Duration,
        surface: &mut dyn RenderSurface,
    ) -> Result<FrameReport, RenderError>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        self.keyboard.retrigger(&mut self.state);
        if let Some(serial) = self.serial.as_mut() {
            serial.retrigger(&mut self.state);
        }

        for event in events {
            self.keyboard.handle_event(event, &mut self.state);
        }

        let serial_frame = match self.serial.as_mut() {
            Some(serial) => serial.poll(&mut self.calibration, &mut self.state),
            None => None,
        };

        let delta_seconds = frame_dt.min(self.max_frame_delta).as_secs_f32();
        self.state.update(delta_seconds);

        let rendered_scene = self.state.active_scene_key();
        surface.clear();
        self.state.render(surface);

        let switched_to = self.state.apply_pending_scene();
        let thresholds_written = self.persist_thresholds_if_requested();

        surface.present()?;

        Ok(FrameReport {
            delta_seconds,
            rendered_scene,
            switched_to,
            serial_frame,
            thresholds_written,
        })
    }

    fn persist_thresholds_if_requested(&mut self) -> bool {
        if !self.state.take_write_request() {
            return false;
        }
        match self.calibration.write_thresholds(&self.thresholds_path) {
            Ok(stats) => {
                if let Some(serial) = self.serial.as_mut() {
                    serial.apply_thresholds(&stats);
                }
                true
            }
            Err(error) => {
                error!(error = %error, "thresholds_write_failed");
                false
            }
        }
    }

    pub fn should_exit(&self) -> bool {
        self.state.should_exit()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn serial(&self) -> Option<&SerialInput> {
        self.serial.as_ref()
    }
}
