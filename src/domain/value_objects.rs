//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use crate::domain::errors::ValidationError;
use serde::Serialize;

/// Maximum length of a single DNS label (RFC 1035).
pub const MAX_LABEL_LEN: usize = 63;

/// A validated, lower-cased DNS label.
///
/// The only way to obtain one is [`SubdomainLabel::parse`], so holding a
/// `SubdomainLabel` means the input already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubdomainLabel(String);

impl SubdomainLabel {
    /// Parse and normalize a raw subdomain label.
    ///
    /// Surrounding whitespace is trimmed and ASCII letters are lower-cased
    /// before validation.
    ///
    /// # Examples
    /// ```
    /// use domain_provisioner::SubdomainLabel;
    ///
    /// assert_eq!(SubdomainLabel::parse("Salt").unwrap().as_str(), "salt");
    /// assert!(SubdomainLabel::parse("-salt").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let label = raw.trim().to_ascii_lowercase();

        if label.is_empty() {
            return Err(ValidationError::Missing);
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(ValidationError::TooLong { len: label.len() });
        }
        if let Some(ch) = label
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(ValidationError::InvalidCharacter { ch });
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(ValidationError::HyphenBoundary);
        }

        Ok(Self(label))
    }

    /// Parse an optional label, treating `None` as missing.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            Some(raw) => Self::parse(raw),
            None => Err(ValidationError::Missing),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified host name under `base_domain`.
    pub fn fqdn(&self, base_domain: &str) -> String {
        format!("{}.{}", self.0, base_domain.trim_matches('.'))
    }
}

impl std::fmt::Display for SubdomainLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two provisioning steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisioningStep {
    /// CNAME record creation
    Dns,
    /// Worker route creation
    Routing,
}

impl ProvisioningStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::Routing => "routing",
        }
    }
}

impl std::fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
