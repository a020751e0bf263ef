//! Lifecycle of one independent fetch

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Outcome of the latest request for one fetch (metadata or forecast).
///
/// Created `Pending` at dispatch, resolved exactly once, and replaced whole by
/// the next dispatch for the same fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum RequestOutcome<T> {
    Idle,
    Pending,
    Success(T),
    Failure(String),
}

impl<T> Default for RequestOutcome<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestOutcome<T> {
    /// Resolve a fetch result, flattening the error into its banner text.
    pub fn from_result(result: Result<T, ForecastError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err.to_string()),
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }

    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let ok: RequestOutcome<u32> = RequestOutcome::from_result(Ok(3));
        assert_eq!(ok.success(), Some(&3));
        assert!(ok.is_resolved());

        let err: RequestOutcome<u32> =
            RequestOutcome::from_result(Err(ForecastError::Service("No data found".into())));
        assert_eq!(err.failure(), Some("No data found"));
    }

    #[test]
    fn test_default_is_idle() {
        let outcome: RequestOutcome<()> = RequestOutcome::default();
        assert_eq!(outcome, RequestOutcome::Idle);
        assert!(!outcome.is_pending());
        assert!(!outcome.is_resolved());
    }
}
