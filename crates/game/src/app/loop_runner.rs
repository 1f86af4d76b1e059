use std::process::ExitCode;

use calibration_engine::run_app;
use tracing::error;

use super::bootstrap::{build_app, AppWiring};

pub(crate) fn run() -> ExitCode {
    let AppWiring { config, paths } = match build_app() {
        Ok(wiring) => wiring,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run_app(config, &paths) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
