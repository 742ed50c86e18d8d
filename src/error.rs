//! Error types.
//!
//! Two layers: [`ValueError`] is what a single value kind reports when it
//! cannot turn text into a value, and [`ConfError`] is what the engine reports
//! to its caller. Kind errors are lifted into [`ConfError::InvalidValue`] with
//! the option name attached, except allocation failures, which pass through
//! unchanged as [`ConfError::Alloc`].

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to parse or duplicate a single option value.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("'{0}' is not a base-10 unsigned integer")]
    NotANumber(String),

    #[error("'{0}' does not fit in 32 bits")]
    Overflow(String),

    #[error("shortcut step has no key symbol")]
    EmptySymbol,

    #[error("shortcut steps without modifiers must be separated by ','")]
    MissingSeparator,

    #[error("unknown modifier '<{0}>'")]
    UnknownModifier(String),

    #[error("unterminated modifier tag in '{0}'")]
    UnterminatedModifier(String),

    #[error("unknown key symbol '{0}'")]
    UnknownSymbol(String),

    #[error("out of memory")]
    Alloc(#[from] TryReserveError),
}

#[derive(Debug, Error)]
pub enum ConfError {
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    #[error("Option '{name}' requires an argument")]
    MissingArgument { name: String },

    #[error("Option '{name}' does not take an argument")]
    UnexpectedArgument { name: String },

    #[error("Option '{name}' is not a boolean and cannot be negated")]
    NotNegatable { name: String },

    #[error("Invalid value for '{name}': {source}")]
    InvalidValue { name: String, source: ValueError },

    #[error("Unexpected argument '{0}'")]
    StrayArgument(String),

    #[error("Unparsed remaining arguments starting with '{0}'")]
    UnclaimedTrailing(String),

    #[error("{0}")]
    Usage(String),

    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{path}:{line}: {source}")]
    InFile {
        path: PathBuf,
        line: usize,
        source: Box<ConfError>,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Out of memory")]
    Alloc(#[from] TryReserveError),

    #[error("Duplicate option name '--{0}'")]
    DuplicateName(String),

    #[error("Duplicate short option '-{0}'")]
    DuplicateShortName(char),

    #[error("Options '--{first}' and '--{second}' both consume trailing arguments")]
    MultipleTrailingConsumers { first: String, second: String },

    #[error("Option '--{0}' is not the designated consumer of trailing arguments")]
    TrailingNotDesignated(String),

    #[error("Trailing arguments were already claimed")]
    TrailingAlreadyClaimed,

    #[error("Logger setup failed: {0}")]
    Logger(String),

    #[error("app_name is required")]
    AppNameRequired,

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfError {
    /// Attach an option name to a kind-level error.
    ///
    /// Allocation failures are not about the option; they stay generic.
    pub fn invalid_value(name: &str, source: ValueError) -> Self {
        match source {
            ValueError::Alloc(e) => ConfError::Alloc(e),
            source => ConfError::InvalidValue {
                name: name.to_string(),
                source,
            },
        }
    }

    /// Whether this error came from a file that exists but could not be read.
    ///
    /// The loader treats these as recoverable and keeps going.
    pub fn is_unreadable_file(&self) -> bool {
        matches!(self, ConfError::IoError { .. })
    }
}
