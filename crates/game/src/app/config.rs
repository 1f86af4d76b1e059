use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use calibration_engine::LoopConfig;
use thiserror::Error;

pub(crate) const CONFIG_ENV_VAR: &str = "CALIBRATION_CONFIG";
pub(crate) const SERIAL_REPLAY_ENV_VAR: &str = "CALIBRATION_SERIAL_REPLAY";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "calibration.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the config comes from and whether its absence is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConfigSource {
    pub(crate) path: PathBuf,
    pub(crate) required: bool,
}

impl ConfigSource {
    pub(crate) fn resolve(root: &Path, env_override: Option<String>) -> Self {
        match env_override.filter(|value| !value.trim().is_empty()) {
            Some(path) => Self {
                path: PathBuf::from(path),
                required: true,
            },
            None => Self {
                path: root.join(DEFAULT_CONFIG_FILE),
                required: false,
            },
        }
    }
}

/// Returns `Ok(None)` when an optional config file is absent.
pub(crate) fn load_config(source: &ConfigSource) -> Result<Option<LoopConfig>, ConfigError> {
    let raw = match fs::read_to_string(&source.path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound && !source.required => {
            return Ok(None)
        }
        Err(source_error) => {
            return Err(ConfigError::Read {
                path: source.path.clone(),
                source: source_error,
            })
        }
    };
    parse_config(&raw, &source.path).map(Some)
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> Result<LoopConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, LoopConfig>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            field: if field.is_empty() { ".".to_string() } else { field },
            source: error.into_inner(),
        }
    })
}

pub(crate) fn apply_env_overrides(config: &mut LoopConfig, serial_replay: Option<String>) {
    if let Some(replay) = serial_replay.filter(|value| !value.trim().is_empty()) {
        config.serial.replay_path = Some(PathBuf::from(replay));
    }
}
