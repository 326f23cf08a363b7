use gazette_core::{ConfigError, SourceError, SourceErrorKind, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Config(_) => 3,
            Self::Serialization(_) => 4,
            Self::Source(error) => match error.kind() {
                SourceErrorKind::InvalidRequest => 2,
                SourceErrorKind::Transient | SourceErrorKind::RateLimited => 6,
                SourceErrorKind::Rejected | SourceErrorKind::Normalization => 7,
                SourceErrorKind::Internal => 8,
            },
            Self::Io(_) => 10,
        }
    }
}
