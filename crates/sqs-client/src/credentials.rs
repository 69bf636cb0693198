//! Credentials and region configuration.
//!
//! A client is bound to one [`Credentials`] pair and one [`Region`] at
//! construction time. Neither changes afterwards.

use crate::error::ConfigurationError;
use std::fmt;
use url::Url;
use zeroize::Zeroizing;

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

const ACCESS_KEY_VARS: [&str; 2] = ["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY"];
const SECRET_KEY_VARS: [&str; 2] = ["AWS_SECRET_ACCESS_KEY", "AWS_SECRET_KEY"];

// ============================================================================
// Secret Key
// ============================================================================

/// Secure container for the signing key.
///
/// The value is wiped from memory on drop and never appears in Debug output.
#[derive(Clone)]
pub struct SecretKey {
    inner: Zeroizing<String>,
}

impl SecretKey {
    /// Wrap a secret key value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(value.into()),
        }
    }

    /// Get secret as bytes (only for immediate use)
    pub fn expose_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Check if secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Access key and secret key used to sign requests
#[derive(Debug, Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: SecretKey,
}

impl Credentials {
    /// Create credentials from an explicit key pair
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: SecretKey::new(secret_key),
        }
    }

    /// Load credentials from the standard environment variables.
    ///
    /// `AWS_ACCESS_KEY_ID` (or `AWS_ACCESS_KEY`) and `AWS_SECRET_ACCESS_KEY`
    /// (or `AWS_SECRET_KEY`) must both be set and non-empty.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let access_key = first_env_var(&ACCESS_KEY_VARS)?;
        let secret_key = first_env_var(&SECRET_KEY_VARS)?;
        Ok(Self::new(access_key, secret_key))
    }

    /// Public identifier sent with every request
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Signing key
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

fn first_env_var(names: &[&str]) -> Result<String, ConfigurationError> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
        .ok_or_else(|| ConfigurationError::Missing {
            key: names.join(" or "),
        })
}

// ============================================================================
// Region
// ============================================================================

const KNOWN_REGIONS: [&str; 8] = [
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "sa-east-1",
];

/// Region name plus the base endpoint of the queue service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    name: String,
    endpoint: String,
    base_path: String,
}

impl Region {
    /// Look up one of the built-in regions by name
    pub fn from_name(name: &str) -> Result<Self, ConfigurationError> {
        if !KNOWN_REGIONS.contains(&name) {
            return Err(ConfigurationError::UnknownRegion {
                name: name.to_string(),
            });
        }

        Ok(Self::custom(name, format!("https://sqs.{}.amazonaws.com", name)))
    }

    /// Region with an explicit endpoint, e.g. a local compatible service
    pub fn custom(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let base_path = Url::parse(&endpoint)
            .map(|url| url.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        Self {
            name: name.into(),
            endpoint,
            base_path,
        }
    }

    pub fn us_east_1() -> Self {
        Self::custom("us-east-1", "https://sqs.us-east-1.amazonaws.com")
    }

    /// Region name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base endpoint URL without trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL for a resource path on this region's endpoint
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}/{}", self.endpoint, path)
        }
    }

    /// Strip the endpoint's own base path from a resource path, so that
    /// `url_for` does not repeat it
    pub fn resource_path<'p>(&self, path: &'p str) -> &'p str {
        if self.base_path.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some(rest) if rest.starts_with('/') => rest,
            Some("") => "/",
            _ => path,
        }
    }

    /// Names of the built-in regions
    pub fn known_names() -> &'static [&'static str] {
        &KNOWN_REGIONS
    }
}
