//! Source error taxonomy and the adapter seams used by fallback chains.
//!
//! | Kind | Retried | Origin |
//! |------|---------|--------|
//! | [`SourceErrorKind::InvalidRequest`] | no | rejected input, before any network call |
//! | [`SourceErrorKind::Transient`] | yes | transport failure, timeout, 5xx/408, undecodable body |
//! | [`SourceErrorKind::RateLimited`] | yes | HTTP 429, honoring `Retry-After` |
//! | [`SourceErrorKind::Rejected`] | no | any other 4xx |
//! | [`SourceErrorKind::Normalization`] | no | payload decoded but had the wrong shape |
//! | [`SourceErrorKind::Internal`] | no | local failures (cache serialization) |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use time::Date;

use crate::domain::{Candidate, DayFact};
use crate::{ProviderId, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    InvalidRequest,
    Transient,
    RateLimited,
    Rejected,
    Normalization,
    Internal,
}

/// Structured error crossing every component boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retry_after: Option<Duration>,
}

impl SourceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Transient, message)
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self {
            retry_after,
            ..Self::new(SourceErrorKind::RateLimited, message)
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Rejected, message)
    }

    pub fn normalization(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Normalization, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Delay requested by the upstream, only set for rate-limited responses.
    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::Transient | SourceErrorKind::RateLimited
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Transient => "source.transient",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Rejected => "source.rejected",
            SourceErrorKind::Normalization => "source.normalization",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Stock-photo provider used by the image fallback chain.
pub trait ImageSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Searches for images matching `query`, thumbnails scaled to `width`.
    ///
    /// An empty vector means "no hits" and lets the chain move on.
    fn search<'a>(
        &'a self,
        query: &'a str,
        width: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>, SourceError>> + Send + 'a>>;
}

/// Source of "on this day" facts used by the day-facts fallback chain.
pub trait FactSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn facts<'a>(
        &'a self,
        date: Date,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DayFact>, SourceError>> + Send + 'a>>;
}
