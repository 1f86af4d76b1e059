//! Byte transports feeding the serial input source.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serialport::SerialPort;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_DEVICE: &str = "/dev/ttyWF1";
pub const DEFAULT_BAUD: u32 = 115_200;
/// Mid-scale of the sensor's 10-bit range. Keeps channels idle until
/// calibrated thresholds are loaded or written.
pub const DEFAULT_THRESHOLD: f64 = 512.0;
const DESK_TEST_FRAME: &str = "200 300 400";

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("serial read failed: {0}")]
    Read(#[source] io::Error),
    #[error("failed to open serial device {device} at {baud} baud: {source}")]
    Open {
        device: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },
    #[error("failed to read serial capture {path}: {source}")]
    Capture {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Non-blocking byte source. `read_byte` returns `Ok(None)` at end of data.
pub trait SerialTransport {
    fn bytes_available(&mut self) -> usize;
    fn read_byte(&mut self) -> Result<Option<u8>, SerialError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub device: String,
    pub baud: u32,
    /// Capture file replayed as the serial stream, one frame per line.
    pub replay_path: Option<PathBuf>,
    /// Serve the fixed desk-test frame instead of opening `device`.
    pub desk_test: bool,
    pub myo1_retrigger: bool,
    pub myo2_retrigger: bool,
    pub eeg_retrigger: bool,
    /// Runtime threshold used for every channel until calibration data exists.
    pub default_threshold: f64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            replay_path: None,
            desk_test: false,
            myo1_retrigger: false,
            myo2_retrigger: false,
            eeg_retrigger: false,
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// In-memory transport serving one frame per poll.
///
/// Each frame becomes available only after the previous one has been fully
/// read. A looping transport restarts from the first frame when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSerial {
    frames: Vec<Vec<u8>>,
    next_frame: usize,
    pending: VecDeque<u8>,
    looping: bool,
}

impl ScriptedSerial {
    pub fn new<I, S>(frames: I, looping: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let frames = frames
            .into_iter()
            .map(|frame| {
                let mut bytes = frame.as_ref().as_bytes().to_vec();
                bytes.push(b'\n');
                bytes
            })
            .collect();
        Self {
            frames,
            next_frame: 0,
            pending: VecDeque::new(),
            looping,
        }
    }

    /// Repeats a fixed mid-scale frame forever, for running without a sensor.
    pub fn desk_test() -> Self {
        Self::new([DESK_TEST_FRAME], true)
    }

    pub fn from_capture_file(path: &Path, looping: bool) -> Result<Self, SerialError> {
        let text = fs::read_to_string(path).map_err(|source| SerialError::Capture {
            path: path.to_path_buf(),
            source,
        })?;
        let frames = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        Ok(Self::new(frames, looping))
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn load_next_frame(&mut self) {
        if self.next_frame >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return;
            }
            self.next_frame = 0;
        }
        self.pending.extend(self.frames[self.next_frame].iter().copied());
        self.next_frame += 1;
    }
}

impl SerialTransport for ScriptedSerial {
    fn bytes_available(&mut self) -> usize {
        if self.pending.is_empty() {
            self.load_next_frame();
        }
        self.pending.len()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
        Ok(self.pending.pop_front())
    }
}

/// A tty opened through `serialport` with a zero read timeout.
pub struct DeviceSerial {
    device: String,
    port: Box<dyn SerialPort>,
}

impl DeviceSerial {
    pub fn open(device: &str, baud: u32) -> Result<Self, SerialError> {
        let port = serialport::new(device, baud)
            .timeout(Duration::ZERO)
            .open()
            .map_err(|source| SerialError::Open {
                device: device.to_string(),
                baud,
                source,
            })?;
        Ok(Self {
            device: device.to_string(),
            port,
        })
    }
}

impl SerialTransport for DeviceSerial {
    fn bytes_available(&mut self) -> usize {
        match self.port.bytes_to_read() {
            Ok(count) => count as usize,
            Err(error) => {
                warn!(device = %self.device, error = %error, "serial_bytes_to_read_failed");
                0
            }
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(error) => Err(SerialError::Read(error)),
        }
    }
}

/// Opens the transport described by `config`, in order of preference: a
/// replay capture, the desk-test stream when enabled, then the device.
pub fn open_transport(config: &SerialConfig) -> Result<Box<dyn SerialTransport>, SerialError> {
    if let Some(path) = &config.replay_path {
        let transport = ScriptedSerial::from_capture_file(path, true)?;
        info!(
            path = %path.display(),
            frames = transport.frame_count(),
            "serial_replay_opened"
        );
        return Ok(Box::new(transport));
    }

    if config.desk_test {
        info!(frame = DESK_TEST_FRAME, "serial_desk_test_stream_opened");
        return Ok(Box::new(ScriptedSerial::desk_test()));
    }

    let transport = DeviceSerial::open(&config.device, config.baud)?;
    info!(
        device = %config.device,
        baud = config.baud,
        "serial_device_opened"
    );
    Ok(Box::new(transport))
}
