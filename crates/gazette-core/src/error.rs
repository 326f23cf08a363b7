use thiserror::Error;

/// Request-parameter validation errors raised before any upstream call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("currency must be a 3-letter alphabetic ISO code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("country must be a 2-letter alphabetic ISO code: '{value}'")]
    InvalidCountry { value: String },

    #[error("coin id '{value}' is not in the allow-list")]
    UnknownCoin { value: String },

    #[error("image width must be between {min} and {max} pixels, got {value}")]
    InvalidImageWidth { value: u32, min: u32, max: u32 },
}

/// Configuration errors raised while assembling a [`crate::FeedConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value '{value}': {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("retry policy must allow at least one attempt")]
    ZeroAttempts,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
