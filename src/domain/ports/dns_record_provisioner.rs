//! DNS Record Provisioner Port
//!
//! Defines the interface for creating the CNAME record of a subdomain.

use crate::domain::entities::SubResult;
use crate::domain::errors::TransportError;
use crate::domain::value_objects::SubdomainLabel;
use async_trait::async_trait;

/// Authority that maps a subdomain onto the platform's canonical host.
///
/// Expected business failures (permission denied, conflicting record) are
/// reported as `Ok` with `success: false`. Only transport or infrastructure
/// problems are returned as `Err`.
///
/// Implementations should report an already existing record as success so
/// that retrying a partially failed provisioning is harmless.
#[async_trait]
pub trait DnsRecordProvisioner: Send + Sync {
    /// Create a CNAME record for `subdomain`.
    async fn create_cname_record(
        &self,
        subdomain: &SubdomainLabel,
    ) -> Result<SubResult, TransportError>;
}
