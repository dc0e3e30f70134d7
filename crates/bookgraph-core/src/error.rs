use thiserror::Error;

/// Failure reported by a [`WorkLookup`](crate::lookup::WorkLookup) implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("work not found: {0}")]
    NotFound(String),

    #[error("lookup failed in {source_name}: {message}")]
    Failure {
        source_name: String,
        message: String,
    },
}

impl LookupError {
    pub fn failure(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// All errors that can surface from bookgraph-core.
#[derive(Debug, Error)]
pub enum BookgraphError {
    #[error("Root work not found: {0}")]
    RootNotFound(String),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Rebuild cancelled")]
    Cancelled,

    #[error("Rebuild task failed: {0}")]
    Task(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes used by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    NetworkError = 6,
}

impl BookgraphError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::RootNotFound(_) | Self::Lookup(LookupError::NotFound(_)) => ExitCode::NotFound,
            Self::Lookup(LookupError::Failure { .. }) => ExitCode::NetworkError,
            Self::ConfigError(_) | Self::TomlParse(_) => ExitCode::InvalidArgs,
            _ => ExitCode::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, BookgraphError>;
