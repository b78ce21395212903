//! Custom Domain Provisioner Library
//!
//! This module exposes the provisioner components for use in integration
//! tests, the `setup-domain` tool and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{DomainProvisioner, DEFAULT_STEP_TIMEOUT};
pub use config::{load_config, Config, ConfigError};
pub use domain::entities::{ProvisioningOutcome, SubResult};
pub use domain::errors::{TransportError, ValidationError};
pub use domain::ports::{DnsRecordProvisioner, RouteProvisioner};
pub use domain::value_objects::{ProvisioningStep, SubdomainLabel};

use adapters::outbound::{CloudflareClient, CloudflareDnsProvisioner, CloudflareRouteProvisioner};
use std::sync::Arc;

/// Wire a provisioner backed by the Cloudflare adapters.
pub fn build_provisioner(cfg: &Config) -> DomainProvisioner {
    let client = Arc::new(CloudflareClient::new(cfg.cloudflare()));
    DomainProvisioner::new(
        Arc::new(CloudflareDnsProvisioner::new(client.clone())),
        Arc::new(CloudflareRouteProvisioner::new(client)),
        cfg.step_timeout(),
    )
}
