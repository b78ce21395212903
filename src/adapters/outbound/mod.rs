mod cloudflare_client;
mod cloudflare_dns_provisioner;
mod cloudflare_route_provisioner;

pub use cloudflare_client::{
    ApiEnvelope, ApiMessage, CloudflareClient, CloudflareConfig, DEFAULT_API_BASE_URL,
};
pub use cloudflare_dns_provisioner::CloudflareDnsProvisioner;
pub use cloudflare_route_provisioner::CloudflareRouteProvisioner;
