//! Cloudflare API Client
//!
//! Thin HTTP client shared by the Cloudflare adapters. Every response goes
//! through [`ApiEnvelope`] parsing, so a body that does not look like a
//! Cloudflare v4 envelope is a transport error rather than a guess.
//!
//! See: https://developers.cloudflare.com/api/

use crate::domain::errors::TransportError;
use serde::Deserialize;

/// Default root of the Cloudflare v4 REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Upstream bodies quoted in errors are cut to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Configuration for the Cloudflare adapters.
#[derive(Clone)]
pub struct CloudflareConfig {
    /// Base URL of the API (overridden in tests)
    pub api_base_url: String,
    /// Bearer token with DNS and Workers route edit permissions
    pub api_token: String,
    /// Zone that owns `base_domain`
    pub zone_id: String,
    /// Parent domain of provisioned labels (e.g. "norsegong.com")
    pub base_domain: String,
    /// Canonical host the CNAME records point at
    pub cname_target: String,
    /// Worker script that receives routed traffic
    pub worker_script: String,
}

impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &"<redacted>")
            .field("zone_id", &self.zone_id)
            .field("base_domain", &self.base_domain)
            .field("cname_target", &self.cname_target)
            .field("worker_script", &self.worker_script)
            .finish()
    }
}

/// A single entry of the envelope's `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Standard Cloudflare v4 response envelope.
///
/// `success` is mandatory; everything else tolerates being absent or null.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ApiMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ApiMessage>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiEnvelope {
    /// Whether any reported error carries one of `codes`.
    pub fn has_error_code(&self, codes: &[i64]) -> bool {
        self.errors.iter().any(|e| codes.contains(&e.code))
    }

    /// Errors joined as "code: message; code: message".
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "unknown error".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// The `id` of the created resource, if the API returned one.
    pub fn result_id(&self) -> Option<&str> {
        self.result.as_ref()?.get("id")?.as_str()
    }
}

/// Cloudflare REST client.
pub struct CloudflareClient {
    config: CloudflareConfig,
    http: reqwest::Client,
}

impl CloudflareClient {
    pub fn new(config: CloudflareConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &CloudflareConfig {
        &self.config
    }

    /// POST `body` to `path` (relative to the API root) and parse the envelope.
    ///
    /// A non-2xx status with a valid envelope is returned as `Ok`; Cloudflare
    /// reports business failures that way.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ApiEnvelope, TransportError> {
        let url = format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<ApiEnvelope>(&text) {
            Ok(envelope) => {
                tracing::debug!(status = status.as_u16(), success = envelope.success, "cloudflare response");
                Ok(envelope)
            }
            Err(e) if status.is_success() => Err(TransportError::MalformedResponse(e.to_string())),
            Err(_) => Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(&text),
            }),
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
pub(crate) fn test_config(api_base_url: &str) -> CloudflareConfig {
    CloudflareConfig {
        api_base_url: api_base_url.to_string(),
        api_token: "test-token".to_string(),
        zone_id: "zone-123".to_string(),
        base_domain: "norsegong.com".to_string(),
        cname_target: "brand-worker.torarnehave.workers.dev".to_string(),
        worker_script: "brand-worker".to_string(),
    }
}
