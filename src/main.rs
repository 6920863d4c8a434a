use std::path::{Path, PathBuf};
use std::process::ExitCode;

use level_calibration::calibration::execute;
use level_calibration::config::CONFIG_ENV;
use level_calibration::Config;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let result = Config::discover(explicit.as_deref(), Path::new("."))
        .and_then(|config| execute(&config, &mut std::io::stdout().lock()));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
