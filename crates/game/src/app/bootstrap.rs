use calibration_engine::{resolve_app_paths, AppPaths, LoopConfig, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{
    apply_env_overrides, load_config, ConfigError, ConfigSource, CONFIG_ENV_VAR,
    SERIAL_REPLAY_ENV_VAR,
};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Calibration Startup ===");

    let paths = resolve_app_paths()?;
    let source = ConfigSource::resolve(&paths.root, std::env::var(CONFIG_ENV_VAR).ok());
    let mut config = match load_config(&source)? {
        Some(config) => {
            info!(path = %source.path.display(), "config_loaded");
            config
        }
        None => LoopConfig::default(),
    };
    apply_env_overrides(&mut config, std::env::var(SERIAL_REPLAY_ENV_VAR).ok());

    info!(
        root = %paths.root.display(),
        assets_dir = %paths.assets_dir.display(),
        serial_device = %config.serial.device,
        serial_replay = ?config.serial.replay_path,
        "startup"
    );

    Ok(AppWiring { config, paths })
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
