//! Raw sample capture and threshold derivation for the three sensor channels.

mod analysis;
mod buffer;
mod thresholds;

use std::path::Path;

use tracing::info;

pub use analysis::{analyze, ChannelStats};
pub use buffer::{SampleBuffer, SAMPLE_CAPACITY};
pub use thresholds::{
    format_thresholds, load_thresholds, parse_thresholds, write_thresholds, ThresholdsError,
};

pub const CHANNEL_COUNT: usize = 3;

/// Sensor channels in frame and file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Myo1,
    Myo2,
    Eeg,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Myo1, Channel::Myo2, Channel::Eeg];

    pub fn index(self) -> usize {
        match self {
            Channel::Myo1 => 0,
            Channel::Myo2 => 1,
            Channel::Eeg => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Myo1 => "myo1",
            Channel::Myo2 => "myo2",
            Channel::Eeg => "eeg",
        }
    }
}

/// Owns one [`SampleBuffer`] per channel for the whole session.
#[derive(Debug, Clone)]
pub struct Calibration {
    buffers: [SampleBuffer; CHANNEL_COUNT],
}

impl Calibration {
    pub fn new() -> Self {
        Self::with_capacity(SAMPLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: std::array::from_fn(|_| SampleBuffer::with_capacity(capacity)),
        }
    }

    pub fn append(&mut self, frame: [u32; CHANNEL_COUNT]) {
        for (buffer, sample) in self.buffers.iter_mut().zip(frame) {
            buffer.push(sample);
        }
    }

    pub fn buffer(&self, channel: Channel) -> &SampleBuffer {
        &self.buffers[channel.index()]
    }

    /// Number of frames held, capped at the buffer capacity.
    pub fn sample_count(&self) -> usize {
        self.buffers[0].len()
    }

    pub fn analyze_all(&self) -> [ChannelStats; CHANNEL_COUNT] {
        std::array::from_fn(|index| analyze(self.buffers[index].valid()))
    }

    /// Analyzes every channel and persists the result to `path`.
    pub fn write_thresholds(
        &self,
        path: &Path,
    ) -> Result<[ChannelStats; CHANNEL_COUNT], ThresholdsError> {
        let stats = self.analyze_all();
        write_thresholds(path, &stats)?;
        info!(
            path = %path.display(),
            samples = self.sample_count(),
            "thresholds_written"
        );
        Ok(stats)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn append_routes_values_by_channel() {
        let mut calibration = Calibration::with_capacity(8);
        calibration.append([1, 2, 3]);
        calibration.append([4, 5, 6]);

        assert_eq!(calibration.buffer(Channel::Myo1).valid(), &[1, 4]);
        assert_eq!(calibration.buffer(Channel::Myo2).valid(), &[2, 5]);
        assert_eq!(calibration.buffer(Channel::Eeg).valid(), &[3, 6]);
        assert_eq!(calibration.sample_count(), 2);
    }

    #[test]
    fn write_thresholds_persists_analysis_per_channel() {
        let mut calibration = Calibration::with_capacity(16);
        for value in [1, 1, 2, 2, 3, 3, 4, 4] {
            calibration.append([value, value * 10, 0]);
        }
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("thresholds.txt");

        let stats = calibration.write_thresholds(&path).expect("write");
        assert_eq!(stats[Channel::Myo1.index()].low_avg, 1.5);
        assert_eq!(stats[Channel::Myo2.index()].high_avg, 35.0);

        let loaded = load_thresholds(&path).expect("load").expect("present");
        assert_eq!(loaded, stats);
    }

    #[test]
    fn channel_order_matches_indices() {
        for (position, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), position);
        }
    }
}
