//! Logging Setup
//!
//! Installs the global `tracing` subscriber for binaries embedding the
//! framework. Library code only emits events; it never installs a
//! subscriber on its own.

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;
use crate::error::{Error, Result};

/// Map a level name to a `tracing` level, defaulting to INFO.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    let directive = |s: &str| -> Result<Directive> {
        s.parse()
            .map_err(|e| Error::Config(format!("invalid log directive {}: {}", s, e)))
    };
    Ok(EnvFilter::from_default_env()
        .add_directive(parse_level(&config.level).into())
        .add_directive(directive("hyper=warn")?)
        .add_directive(directive("kube=info")?)
        .add_directive(directive("tower=warn")?))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    };

    installed.map_err(|e| Error::Config(format!("logging already initialized: {}", e)))
}
