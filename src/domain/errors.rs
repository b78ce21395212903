//! Domain Errors
//!
//! Input validation failures and collaborator transport failures.
//! Business failures reported by a collaborator are not errors; they are
//! carried as a failed [`SubResult`](crate::domain::entities::SubResult).

use crate::domain::value_objects::{ProvisioningStep, MAX_LABEL_LEN};
use std::time::Duration;

/// Rejected subdomain input. No outbound call is made when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Subdomain is required")]
    Missing,
    #[error("Subdomain must be at most {max} characters, got {len}", max = MAX_LABEL_LEN)]
    TooLong { len: usize },
    #[error("Subdomain contains invalid character {ch:?}; only letters, digits and hyphens are allowed")]
    InvalidCharacter { ch: char },
    #[error("Subdomain must not start or end with a hyphen")]
    HyphenBoundary,
}

/// Unexpected failure while talking to a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("{step} step timed out after {}s", .after.as_secs_f64())]
    Timeout {
        step: ProvisioningStep,
        after: Duration,
    },
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
    #[error("unexpected upstream status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}
