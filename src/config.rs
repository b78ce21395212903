use crate::adapters::outbound::{CloudflareConfig, DEFAULT_API_BASE_URL};
use std::time::Duration;

/// Variables that have no default and must be provided.
pub const REQUIRED_VARS: [&str; 2] = ["CF_API_TOKEN", "CF_ZONE_ID"];

#[derive(Clone)]
pub struct Config {
    // HTTP API settings
    pub listen_addr: String,
    pub debug: bool,

    // Cloudflare credentials
    pub api_token: String,
    pub zone_id: String,
    pub api_base_url: String,

    // Provisioning targets
    pub base_domain: String,
    pub cname_target: String,
    pub worker_script: String,

    // Workflow hardening
    pub step_timeout_secs: u64,
    pub serialize_inflight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            debug: false,
            api_token: String::new(),
            zone_id: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            base_domain: "norsegong.com".to_string(),
            cname_target: "brand-worker.torarnehave.workers.dev".to_string(),
            worker_script: "brand-worker".to_string(),
            step_timeout_secs: 10,
            serialize_inflight: true,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("debug", &self.debug)
            .field("api_token", &"<redacted>")
            .field("zone_id", &self.zone_id)
            .field("api_base_url", &self.api_base_url)
            .field("base_domain", &self.base_domain)
            .field("cname_target", &self.cname_target)
            .field("worker_script", &self.worker_script)
            .field("step_timeout_secs", &self.step_timeout_secs)
            .field("serialize_inflight", &self.serialize_inflight)
            .finish()
    }
}

impl Config {
    /// Build a configuration from a variable lookup.
    ///
    /// `load_config` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|key| var(**key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let flag = |key: &str, default: bool| {
            var(key)
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(default)
        };

        Ok(Self {
            listen_addr: var("PROVISIONER_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            debug: lookup("DEBUG").is_some(),
            api_token: var("CF_API_TOKEN").unwrap_or_default(),
            zone_id: var("CF_ZONE_ID").unwrap_or_default(),
            api_base_url: var("CF_API_BASE_URL").unwrap_or(defaults.api_base_url),
            base_domain: var("PROVISIONER_BASE_DOMAIN").unwrap_or(defaults.base_domain),
            cname_target: var("PROVISIONER_CNAME_TARGET").unwrap_or(defaults.cname_target),
            worker_script: var("PROVISIONER_WORKER_SCRIPT").unwrap_or(defaults.worker_script),
            step_timeout_secs: var("PROVISIONER_STEP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.step_timeout_secs),
            serialize_inflight: flag("PROVISIONER_SERIALIZE_INFLIGHT", defaults.serialize_inflight),
        })
    }

    /// Settings for the Cloudflare adapters.
    pub fn cloudflare(&self) -> CloudflareConfig {
        CloudflareConfig {
            api_base_url: self.api_base_url.clone(),
            api_token: self.api_token.clone(),
            zone_id: self.zone_id.clone(),
            base_domain: self.base_domain.clone(),
            cname_target: self.cname_target.clone(),
            worker_script: self.worker_script.clone(),
        }
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

pub fn load_config() -> anyhow::Result<Config> {
    Ok(Config::from_lookup(|key| std::env::var(key).ok())?)
}
