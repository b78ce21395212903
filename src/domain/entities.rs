//! Domain Entities - Core business objects
//!
//! Both entities are request scoped: created when a provisioning request
//! starts and discarded once the response has been sent.

use serde::{Deserialize, Serialize};

/// Outcome of a single provisioning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResult {
    /// Whether the step succeeded
    pub success: bool,
    /// Human-readable description of what happened
    pub message: String,
    /// Extra diagnostic information (upstream ids, raw error text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl SubResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Combined result of the DNS and routing steps.
///
/// `overall_success` is derived at construction and the fields are private,
/// so it can never disagree with the two sub-results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningOutcome {
    overall_success: bool,
    dns_setup: SubResult,
    worker_setup: SubResult,
}

impl ProvisioningOutcome {
    pub fn new(dns_setup: SubResult, worker_setup: SubResult) -> Self {
        Self {
            overall_success: dns_setup.success && worker_setup.success,
            dns_setup,
            worker_setup,
        }
    }

    pub fn overall_success(&self) -> bool {
        self.overall_success
    }

    pub fn dns_setup(&self) -> &SubResult {
        &self.dns_setup
    }

    pub fn worker_setup(&self) -> &SubResult {
        &self.worker_setup
    }
}
