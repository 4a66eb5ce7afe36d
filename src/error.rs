//! Errors surfaced at the lemmatization boundary.
//!
//! Vocabulary misses never show up here: unknown input characters map to the unknown id and
//! unknown output ids resolve to the empty sentinel.

use std::time::Duration;

use thiserror::Error;

/// Why a decode was cut short before reaching a natural stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The wall-clock budget elapsed.
    Timeout(Duration),
    /// The step budget was used up.
    StepBudget(usize),
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout(limit) => write!(f, "timeout of {}ms elapsed", limit.as_millis()),
            Self::StepBudget(limit) => write!(f, "step budget of {limit} exhausted"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LemmaError {
    /// The request cannot be lemmatized as given. Nothing was decoded.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The decoding settings are unusable (zero or oversized lengths).
    #[error("invalid decode config: {0}")]
    InvalidConfig(&'static str),

    /// The encoder or decoder raised an error.
    #[error("model inference failed: {0}")]
    ModelInference(#[from] candle_core::Error),

    /// The decoder returned scores that do not cover the target vocabulary.
    #[error("decoder step {step} returned a malformed distribution: expected {expected} scores without NaN, got {actual}")]
    MalformedDistribution {
        step: usize,
        expected: usize,
        actual: usize,
    },

    /// Decoding was stopped by a caller-provided limit.
    #[error("decoding cancelled after {steps} steps: {reason}")]
    Cancelled { steps: usize, reason: CancelReason },
}

impl LemmaError {
    /// Whether repeating the same call could succeed.
    ///
    /// Decoding is deterministic, so only a cancellation (which depends on wall-clock time or a
    /// caller budget) is worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// True for the two flavours of model failure.
    #[must_use]
    pub fn is_inference_failure(&self) -> bool {
        matches!(
            self,
            Self::ModelInference(_) | Self::MalformedDistribution { .. }
        )
    }
}

pub type LemmaResult<T> = Result<T, LemmaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_failures_are_not_retryable() {
        let err = LemmaError::from(candle_core::Error::Msg("boom".to_string()));
        assert!(err.is_inference_failure());
        assert!(!err.is_retryable());

        let err = LemmaError::MalformedDistribution {
            step: 1,
            expected: 10,
            actual: 3,
        };
        assert!(err.is_inference_failure());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_config_is_not_retryable() {
        let err = LemmaError::InvalidConfig("max_output_length must be positive");
        assert!(!err.is_retryable());
        assert!(!err.is_inference_failure());
        assert_eq!(
            err.to_string(),
            "invalid decode config: max_output_length must be positive"
        );
    }

    #[test]
    fn test_cancel_message_names_reason() {
        let err = LemmaError::Cancelled {
            steps: 4,
            reason: CancelReason::StepBudget(4),
        };
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "decoding cancelled after 4 steps: step budget of 4 exhausted"
        );
    }
}
