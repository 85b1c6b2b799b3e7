//! Tracing subscriber setup shared by both executables

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Console stream used when no log file is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Console {
    #[default]
    Stdout,
    /// For executables whose stdout carries results
    Stderr,
}

/// Install the global fmt subscriber, logging to stdout.
///
/// `RUST_LOG` wins over the configured level. Logs go to the console unless a
/// log file is configured, in which case they are appended to that file.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    init_tracing_to(config, Console::Stdout)
}

/// Install the global fmt subscriber with an explicit console stream
pub fn init_tracing_to(config: &LoggingConfig, console: Console) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| Error::Config(format!("Open log file {} failed: {}", path.display(), e)))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => match console {
            Console::Stdout => builder.with_writer(std::io::stdout).try_init(),
            Console::Stderr => builder.with_writer(std::io::stderr).try_init(),
        },
    };

    installed.map_err(|e| Error::Config(format!("Tracing init failed: {}", e)))
}
