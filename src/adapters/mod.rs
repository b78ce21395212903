//! Adapters Layer
//!
//! Inbound adapters drive the application (HTTP API); outbound adapters
//! implement the domain ports (Cloudflare API).

pub mod inbound;
pub mod outbound;
