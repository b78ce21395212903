//! Route Provisioner Port
//!
//! Defines the interface for registering the edge route of a subdomain.

use crate::domain::entities::SubResult;
use crate::domain::errors::TransportError;
use crate::domain::value_objects::SubdomainLabel;
use async_trait::async_trait;

/// Edge-routing authority that directs a host into application logic.
///
/// Same failure contract as [`DnsRecordProvisioner`](super::DnsRecordProvisioner).
#[async_trait]
pub trait RouteProvisioner: Send + Sync {
    /// Register a worker route for `subdomain`.
    async fn create_worker_route(
        &self,
        subdomain: &SubdomainLabel,
    ) -> Result<SubResult, TransportError>;
}
