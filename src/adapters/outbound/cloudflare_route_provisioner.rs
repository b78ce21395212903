//! Cloudflare Route Provisioner
//!
//! Implements RouteProvisioner by registering a Workers route for
//! `<label>.<base_domain>/*` on the zone.

use super::cloudflare_client::CloudflareClient;
use crate::domain::entities::SubResult;
use crate::domain::errors::TransportError;
use crate::domain::ports::RouteProvisioner;
use crate::domain::value_objects::SubdomainLabel;
use async_trait::async_trait;
use std::sync::Arc;

/// Cloudflare reports a duplicate route pattern with this code.
const ROUTE_EXISTS_CODE: i64 = 10020;

/// Cloudflare-backed worker route provisioning.
pub struct CloudflareRouteProvisioner {
    client: Arc<CloudflareClient>,
}

impl CloudflareRouteProvisioner {
    pub fn new(client: Arc<CloudflareClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RouteProvisioner for CloudflareRouteProvisioner {
    async fn create_worker_route(
        &self,
        subdomain: &SubdomainLabel,
    ) -> Result<SubResult, TransportError> {
        let config = self.client.config();
        let pattern = format!("{}/*", subdomain.fqdn(&config.base_domain));
        let body = serde_json::json!({
            "pattern": pattern,
            "script": config.worker_script,
        });

        let envelope = self
            .client
            .post_json(&format!("/zones/{}/workers/routes", config.zone_id), &body)
            .await?;

        if envelope.success {
            let sub = SubResult::ok(format!("Worker route {} -> {} created", pattern, config.worker_script));
            return Ok(match envelope.result_id() {
                Some(id) => sub.with_details(format!("route id {}", id)),
                None => sub,
            });
        }

        if envelope.has_error_code(&[ROUTE_EXISTS_CODE]) {
            tracing::info!("worker route {} already exists", pattern);
            return Ok(SubResult::ok(format!("Worker route {} already exists", pattern)));
        }

        Ok(SubResult::failed(format!(
            "Failed to create worker route: {}",
            envelope.error_summary()
        )))
    }
}
