//! Ordered fallback over candidate sources: first non-empty result wins.

use std::fmt::Debug;
use std::future::Future;

use tracing::{debug, warn};

use crate::data_source::SourceError;

/// One candidate that did not produce a result.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainFailure<C> {
    pub candidate: C,
    /// `None` when the candidate answered but had nothing.
    pub error: Option<SourceError>,
}

/// Result of walking a fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome<C, T> {
    Success {
        candidate: C,
        items: Vec<T>,
        /// Candidates tried, including the successful one.
        attempts: usize,
        failures: Vec<ChainFailure<C>>,
    },
    Exhausted {
        attempts: usize,
        failures: Vec<ChainFailure<C>>,
    },
}

impl<C, T> ChainOutcome<C, T> {
    pub fn attempts(&self) -> usize {
        match self {
            Self::Success { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Winning items, or nothing on exhaustion.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Success { items, .. } => items,
            Self::Exhausted { .. } => Vec::new(),
        }
    }
}

/// Tries candidates in order until one yields at least one item.
///
/// There is no ranking: the first success wins and later candidates are
/// never attempted. Candidate errors are recorded and never propagated.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackChain;

impl FallbackChain {
    pub async fn select<C, T, I, F, Fut>(candidates: I, mut attempt: F) -> ChainOutcome<C, T>
    where
        C: Clone + Debug,
        I: IntoIterator<Item = C>,
        F: FnMut(C) -> Fut,
        Fut: Future<Output = Result<Vec<T>, SourceError>>,
    {
        let mut attempts = 0;
        let mut failures = Vec::new();

        for candidate in candidates {
            attempts += 1;

            match attempt(candidate.clone()).await {
                Ok(items) if !items.is_empty() => {
                    if !failures.is_empty() {
                        debug!(
                            ?candidate,
                            failed = failures.len(),
                            "fallback succeeded after earlier candidates came up empty"
                        );
                    }
                    return ChainOutcome::Success {
                        candidate,
                        items,
                        attempts,
                        failures,
                    };
                }
                Ok(_) => {
                    debug!(?candidate, "candidate returned no results; trying next");
                    failures.push(ChainFailure {
                        candidate,
                        error: None,
                    });
                }
                Err(error) => {
                    warn!(?candidate, %error, "candidate failed; trying next");
                    failures.push(ChainFailure {
                        candidate,
                        error: Some(error),
                    });
                }
            }
        }

        debug!(attempts, "fallback chain exhausted");
        ChainOutcome::Exhausted { attempts, failures }
    }
}
