//! Domain Provisioner - Main application use case
//!
//! Brings up a custom domain in two sequential steps: the DNS record first,
//! then the worker route. Both steps are always attempted and reported.

use crate::domain::entities::{ProvisioningOutcome, SubResult};
use crate::domain::errors::{TransportError, ValidationError};
use crate::domain::ports::{DnsRecordProvisioner, RouteProvisioner};
use crate::domain::value_objects::{ProvisioningStep, SubdomainLabel};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Default deadline for a single collaborator call.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Domain provisioner - main application use case.
///
/// 1. Validates the subdomain (no side effects on failure)
/// 2. Creates the CNAME record and waits for the result
/// 3. Creates the worker route, whatever step 2 returned
/// 4. Combines both sub-results into one outcome
///
/// Transport errors and timeouts are downgraded to failed sub-results at the
/// step boundary. Nothing is rolled back and nothing is retried.
pub struct DomainProvisioner {
    dns: Arc<dyn DnsRecordProvisioner>,
    routes: Arc<dyn RouteProvisioner>,
    step_timeout: Duration,
}

impl DomainProvisioner {
    /// Create a new domain provisioner.
    pub fn new(
        dns: Arc<dyn DnsRecordProvisioner>,
        routes: Arc<dyn RouteProvisioner>,
        step_timeout: Duration,
    ) -> Self {
        Self {
            dns,
            routes,
            step_timeout,
        }
    }

    /// Validate `subdomain` and provision it.
    ///
    /// Returns `Err` only for invalid input, in which case neither
    /// collaborator has been called.
    pub async fn provision(
        &self,
        subdomain: Option<&str>,
    ) -> Result<ProvisioningOutcome, ValidationError> {
        let label = SubdomainLabel::parse_optional(subdomain)?;
        Ok(self.provision_label(&label).await)
    }

    /// Provision an already validated label.
    pub async fn provision_label(&self, label: &SubdomainLabel) -> ProvisioningOutcome {
        let span = tracing::info_span!("provision", subdomain = %label);

        async {
            tracing::info!("creating CNAME record");
            let dns_setup = self
                .run_step(ProvisioningStep::Dns, self.dns.create_cname_record(label))
                .await;

            tracing::info!("creating worker route");
            let worker_setup = self
                .run_step(ProvisioningStep::Routing, self.routes.create_worker_route(label))
                .await;

            let outcome = ProvisioningOutcome::new(dns_setup, worker_setup);
            if outcome.overall_success() {
                tracing::info!("custom domain provisioned");
            } else {
                tracing::warn!(
                    dns_ok = outcome.dns_setup().success,
                    worker_ok = outcome.worker_setup().success,
                    "custom domain partially provisioned"
                );
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Get the per-step deadline.
    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    async fn run_step<F>(&self, step: ProvisioningStep, call: F) -> SubResult
    where
        F: Future<Output = Result<SubResult, TransportError>>,
    {
        let result = match tokio::time::timeout(self.step_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                step,
                after: self.step_timeout,
            }),
        };

        match result {
            Ok(sub) => {
                if sub.success {
                    tracing::info!(%step, result = %sub.message, "step succeeded");
                } else {
                    tracing::warn!(%step, result = %sub.message, "step reported failure");
                }
                sub
            }
            Err(err) => {
                tracing::error!(%step, error = %err, "step failed");
                SubResult::failed(format!("{} step failed: {}", step, err))
                    .with_details(format!("{:?}", err))
            }
        }
    }
}
