//! Cloudflare DNS Provisioner
//!
//! Implements DnsRecordProvisioner by creating a proxied CNAME record
//! through the zone's `dns_records` endpoint.

use super::cloudflare_client::CloudflareClient;
use crate::domain::entities::SubResult;
use crate::domain::errors::TransportError;
use crate::domain::ports::DnsRecordProvisioner;
use crate::domain::value_objects::SubdomainLabel;
use async_trait::async_trait;
use std::sync::Arc;

/// Error codes Cloudflare uses when the record is already in place.
const RECORD_EXISTS_CODES: [i64; 2] = [81053, 81057];

/// Cloudflare-backed CNAME provisioning.
pub struct CloudflareDnsProvisioner {
    client: Arc<CloudflareClient>,
}

impl CloudflareDnsProvisioner {
    pub fn new(client: Arc<CloudflareClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DnsRecordProvisioner for CloudflareDnsProvisioner {
    async fn create_cname_record(
        &self,
        subdomain: &SubdomainLabel,
    ) -> Result<SubResult, TransportError> {
        let config = self.client.config();
        let fqdn = subdomain.fqdn(&config.base_domain);
        let body = serde_json::json!({
            "type": "CNAME",
            "name": subdomain.as_str(),
            "content": config.cname_target,
            "proxied": true,
        });

        let envelope = self
            .client
            .post_json(&format!("/zones/{}/dns_records", config.zone_id), &body)
            .await?;

        if envelope.success {
            let sub = SubResult::ok(format!("CNAME record created for {}", fqdn));
            return Ok(match envelope.result_id() {
                Some(id) => sub.with_details(format!("record id {}", id)),
                None => sub,
            });
        }

        // Treat a retry as success
        if envelope.has_error_code(&RECORD_EXISTS_CODES) {
            tracing::info!("CNAME record for {} already exists", fqdn);
            return Ok(SubResult::ok(format!("CNAME record already exists for {}", fqdn)));
        }

        Ok(SubResult::failed(format!(
            "Failed to create DNS record: {}",
            envelope.error_summary()
        )))
    }
}
