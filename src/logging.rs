// src/logging.rs

use std::fs::File;
use std::path::PathBuf;

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

lazy_static! {
    static ref LOG_ENV: String = format!("{}_LOGLEVEL", env!("CARGO_CRATE_NAME").to_uppercase());
    static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Log directory under the platform data dir, with a local fallback for
/// environments without a resolvable home.
fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "proxyvet", env!("CARGO_PKG_NAME"))
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

/// Sets up tracing with a file writer; stdout stays reserved for the report.
/// The level comes from `RUST_LOG`, then `PROXYVET_LOGLEVEL`, then `info`.
pub fn initialize_logging() -> Result<()> {
    let directory = log_dir();
    std::fs::create_dir_all(&directory)?;
    let log_file = File::create(directory.join(LOG_FILE.as_str()))?;

    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.as_str()))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}
