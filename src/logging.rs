//! Verbosity selection and subscriber initialisation.
//!
//! The level is picked from the resolved `debug`, `verbose` and `silent`
//! flags right after the command-line pass, so diagnostics emitted while
//! config files are parsed already honour it.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::ConfError;

/// Verbosity handed to the logging subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogConfig {
    /// Warnings and errors only.
    Warning,
    Info { debug: bool, verbose: bool },
}

impl LogConfig {
    /// `silent` only takes effect when neither `debug` nor `verbose` is set.
    pub fn select(debug: bool, verbose: bool, silent: bool) -> Self {
        if !debug && !verbose && silent {
            LogConfig::Warning
        } else {
            LogConfig::Info { debug, verbose }
        }
    }

    pub fn level(self) -> LevelFilter {
        match self {
            LogConfig::Warning => LevelFilter::WARN,
            LogConfig::Info { debug: true, .. } => LevelFilter::TRACE,
            LogConfig::Info { verbose: true, .. } => LevelFilter::DEBUG,
            LogConfig::Info { .. } => LevelFilter::INFO,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig::Info {
            debug: false,
            verbose: false,
        }
    }
}

/// A settings record that knows how loud it wants to be.
pub trait LogSettings {
    fn log_config(&self) -> LogConfig;
}

/// Install a stderr subscriber at the selected level.
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init(config: &LogConfig) -> Result<bool, ConfError> {
    init_with_writer(config, BoxMakeWriter::new(std::io::stderr))
}

/// Install a subscriber at the selected level writing to `writer`.
pub fn init_with_writer<W>(config: &LogConfig, writer: W) -> Result<bool, ConfError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = filter_for(config)?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .is_ok())
}

fn filter_for(config: &LogConfig) -> Result<EnvFilter, ConfError> {
    let level = config.level().to_string().to_lowercase();
    EnvFilter::try_new(&level).map_err(|e| ConfError::Logger(format!("invalid log level '{level}': {e}")))
}
