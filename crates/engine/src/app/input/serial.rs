use tracing::{debug, warn};

use crate::app::command::{Action, Command};
use crate::app::game_state::GameState;
use crate::calibration::{Calibration, Channel, ChannelStats, CHANNEL_COUNT};
use crate::serial::{SerialConfig, SerialTransport};

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    command: Command,
    threshold: f64,
    active: bool,
}

impl ChannelState {
    /// Above the threshold enters active and fires on entry. Below it leaves
    /// active. A value equal to the threshold keeps the current state.
    fn observe(&mut self, value: f64) -> bool {
        if value > self.threshold {
            let entered = !self.active;
            self.active = true;
            entered
        } else {
            if value < self.threshold {
                self.active = false;
            }
            false
        }
    }
}

/// One decoded poll: the channel values and which channels fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialFrame {
    pub values: [u32; CHANNEL_COUNT],
    pub fired: [bool; CHANNEL_COUNT],
}

/// Threshold-crossing input source over a polled serial transport.
///
/// myo1 walks left, myo2 walks right, eeg jumps.
pub struct SerialInput {
    transport: Box<dyn SerialTransport>,
    channels: [ChannelState; CHANNEL_COUNT],
}

impl SerialInput {
    pub fn new(transport: Box<dyn SerialTransport>, config: &SerialConfig) -> Self {
        let channels = Channel::ALL.map(|channel| {
            let command = match channel {
                Channel::Myo1 => Command::new(Action::WalkLeft, config.myo1_retrigger),
                Channel::Myo2 => Command::new(Action::WalkRight, config.myo2_retrigger),
                Channel::Eeg => Command::new(Action::Jump, config.eeg_retrigger),
            };
            ChannelState {
                command,
                threshold: config.default_threshold,
                active: false,
            }
        });
        Self {
            transport,
            channels,
        }
    }

    pub fn threshold(&self, channel: Channel) -> f64 {
        self.channels[channel.index()].threshold
    }

    pub fn set_threshold(&mut self, channel: Channel, threshold: f64) {
        self.channels[channel.index()].threshold = threshold;
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.channels[channel.index()].active
    }

    /// Uses each channel's low threshold as its activation boundary.
    pub fn apply_thresholds(&mut self, stats: &[ChannelStats; CHANNEL_COUNT]) {
        for (channel, stats) in Channel::ALL.into_iter().zip(stats) {
            let threshold = stats.low_threshold();
            self.set_threshold(channel, threshold);
            debug!(
                channel = channel.label(),
                threshold, "serial_threshold_applied"
            );
        }
    }

    /// Reads the bytes currently available and decodes them as one frame.
    ///
    /// Returns `None` without touching `calibration` when no bytes are waiting.
    pub fn poll(
        &mut self,
        calibration: &mut Calibration,
        state: &mut GameState,
    ) -> Option<SerialFrame> {
        let available = self.transport.bytes_available();
        if available == 0 {
            return None;
        }

        let mut bytes = Vec::with_capacity(available);
        for _ in 0..available {
            match self.transport.read_byte() {
                Ok(Some(byte)) => bytes.push(byte),
                Ok(None) => break,
                Err(error) => warn!(error = %error, "serial_read_failed"),
            }
        }

        let values = decode_frame(&bytes);
        calibration.append(values);

        let mut fired = [false; CHANNEL_COUNT];
        for ((channel, value), did_fire) in self.channels.iter_mut().zip(values).zip(&mut fired) {
            if channel.observe(f64::from(value)) {
                channel.command.execute(state);
                *did_fire = true;
            }
        }
        debug!(
            myo1 = values[0],
            myo2 = values[1],
            eeg = values[2],
            "serial_frame_decoded"
        );
        Some(SerialFrame { values, fired })
    }

    /// Re-fires active channels whose command asks for it. Returns how many fired.
    pub fn retrigger(&mut self, state: &mut GameState) -> usize {
        let mut fired = 0;
        for channel in &self.channels {
            if channel.active && channel.command.retrigger() {
                channel.command.execute(state);
                fired += 1;
            }
        }
        fired
    }
}

/// Parses up to three whitespace-separated numbers. Parsing stops at the first
/// token that is not a number; missing values are zero. Fractional and
/// out-of-range values saturate into `u32`.
///
/// `bytes` is everything one poll read, not one line. Line breaks count as
/// whitespace, so when several lines arrived together only the first three
/// numbers are used and the rest are dropped. A line split across two polls
/// yields two partial samples.
pub fn decode_frame(bytes: &[u8]) -> [u32; CHANNEL_COUNT] {
    let text = String::from_utf8_lossy(bytes);
    let mut values = [0u32; CHANNEL_COUNT];
    for (slot, token) in values.iter_mut().zip(text.split_whitespace()) {
        match token.parse::<f64>() {
            Ok(value) => *slot = value as u32,
            Err(_) => break,
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::scene::ActiveScene;
    use crate::app::scenes::EndScene;
    use crate::serial::{ScriptedSerial, SerialError};

    fn end_state() -> GameState {
        GameState::new(ActiveScene::End(EndScene::new()))
    }

    fn input_for(frames: &[&str]) -> SerialInput {
        let transport = ScriptedSerial::new(frames.iter().copied(), false);
        SerialInput::new(Box::new(transport), &SerialConfig::default())
    }

    struct FailingFirstByte {
        bytes: Vec<u8>,
        failed: bool,
    }

    impl SerialTransport for FailingFirstByte {
        fn bytes_available(&mut self) -> usize {
            self.bytes.len() + usize::from(!self.failed)
        }

        fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
            if !self.failed {
                self.failed = true;
                return Err(SerialError::Read(std::io::Error::other("line noise")));
            }
            if self.bytes.is_empty() {
                return Ok(None);
            }
            Ok(Some(self.bytes.remove(0)))
        }
    }

    #[test]
    fn crossing_fires_once_per_rising_edge() {
        let mut input = input_for(&["0 0 50", "0 0 150", "0 0 150", "0 0 50", "0 0 150"]);
        input.set_threshold(Channel::Eeg, 100.0);
        let mut calibration = Calibration::with_capacity(16);
        let mut state = end_state();

        let fired: Vec<bool> = (0..5)
            .map(|_| {
                input
                    .poll(&mut calibration, &mut state)
                    .expect("frame")
                    .fired[Channel::Eeg.index()]
            })
            .collect();
        assert_eq!(fired, vec![false, true, false, false, true]);
    }

    #[test]
    fn value_at_threshold_holds_state() {
        let mut input = input_for(&["0 0 150", "0 0 100", "0 0 150", "0 0 50", "0 0 100"]);
        input.set_threshold(Channel::Eeg, 100.0);
        let mut calibration = Calibration::with_capacity(16);
        let mut state = end_state();

        input.poll(&mut calibration, &mut state);
        assert!(input.is_active(Channel::Eeg));
        input.poll(&mut calibration, &mut state);
        assert!(input.is_active(Channel::Eeg));
        let frame = input.poll(&mut calibration, &mut state).expect("frame");
        assert!(!frame.fired[Channel::Eeg.index()]);

        input.poll(&mut calibration, &mut state);
        assert!(!input.is_active(Channel::Eeg));
        let frame = input.poll(&mut calibration, &mut state).expect("frame");
        assert!(!frame.fired[Channel::Eeg.index()]);
        assert!(!input.is_active(Channel::Eeg));
    }

    #[test]
    fn active_retrigger_channels_fire_every_call() {
        let config = SerialConfig {
            myo1_retrigger: true,
            ..SerialConfig::default()
        };
        let transport = ScriptedSerial::new(["150 0 150"], false);
        let mut input = SerialInput::new(Box::new(transport), &config);
        for channel in Channel::ALL {
            input.set_threshold(channel, 100.0);
        }
        let mut calibration = Calibration::with_capacity(4);
        let mut state = end_state();
        input.poll(&mut calibration, &mut state);

        // Only myo1 asked for retrigger; eeg is active but stays quiet.
        assert_eq!(input.retrigger(&mut state), 1);
        assert_eq!(input.retrigger(&mut state), 1);
    }

    #[test]
    fn default_channels_ignore_the_desk_test_frame() {
        let mut input = SerialInput::new(
            Box::new(ScriptedSerial::desk_test()),
            &SerialConfig::default(),
        );
        let mut calibration = Calibration::with_capacity(8);
        let mut state = end_state();
        for _ in 0..4 {
            let frame = input.poll(&mut calibration, &mut state).expect("frame");
            assert_eq!(frame.fired, [false; CHANNEL_COUNT]);
            assert_eq!(input.retrigger(&mut state), 0);
        }
        assert!(Channel::ALL.iter().all(|channel| !input.is_active(*channel)));
    }

    #[test]
    fn burst_of_lines_decodes_the_first_frame_only() {
        assert_eq!(decode_frame(b"1 2 3\n4 5 6\n"), [1, 2, 3]);
        assert_eq!(decode_frame(b"7 8"), [7, 8, 0]);
    }

    #[test]
    fn every_frame_is_recorded_for_calibration() {
        let mut input = input_for(&["1 2 3", "4 5 6"]);
        let mut calibration = Calibration::with_capacity(8);
        let mut state = end_state();
        input.poll(&mut calibration, &mut state);
        input.poll(&mut calibration, &mut state);

        assert_eq!(calibration.sample_count(), 2);
        assert_eq!(calibration.buffer(Channel::Myo2).valid(), &[2, 5]);
    }

    #[test]
    fn no_bytes_means_no_sample() {
        let mut input = input_for(&[]);
        let mut calibration = Calibration::with_capacity(8);
        let mut state = end_state();
        assert_eq!(input.poll(&mut calibration, &mut state), None);
        assert_eq!(calibration.sample_count(), 0);
    }

    #[test]
    fn read_error_skips_byte_and_keeps_frame() {
        let transport = FailingFirstByte {
            bytes: b"7 8 9".to_vec(),
            failed: false,
        };
        let mut input = SerialInput::new(Box::new(transport), &SerialConfig::default());
        let mut calibration = Calibration::with_capacity(4);
        let mut state = end_state();

        let frame = input.poll(&mut calibration, &mut state).expect("frame");
        assert_eq!(frame.values, [7, 8, 9]);
    }

    #[test]
    fn malformed_frame_defaults_missing_fields() {
        assert_eq!(decode_frame(b"12 abc 7"), [12, 0, 0]);
        assert_eq!(decode_frame(b"3.7 4"), [3, 4, 0]);
        assert_eq!(decode_frame(b"-5 1e12 9 11"), [0, u32::MAX, 9]);
        assert_eq!(decode_frame(b""), [0, 0, 0]);
    }

    #[test]
    fn applied_thresholds_use_low_boundary() {
        let mut input = input_for(&[]);
        let stats = ChannelStats {
            low_avg: 10.0,
            high_avg: 50.0,
            low_std_dev: 2.0,
            high_std_dev: 5.0,
        };
        input.apply_thresholds(&[stats; CHANNEL_COUNT]);
        assert_eq!(input.threshold(Channel::Myo1), 14.0);
        assert_eq!(input.threshold(Channel::Eeg), 14.0);
    }
}
