use std::process::ExitCode;

use morph_particles::{viewer, EngineConfig};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).unwrap_or_else(|e| {
            warn!(path = %path, error = %e, "using default config");
            EngineConfig::default()
        }),
        None => EngineConfig::default(),
    };

    match viewer::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "viewer failed");
            ExitCode::FAILURE
        }
    }
}
