//! Scrape target configuration.
//!
//! A [`TargetConfig`] is the raw YAML shape of one appliance entry. It is
//! turned into an immutable [`Target`] by [`TargetConfig::validate`], which
//! applies defaults and rejects out-of-range values.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::validation::{ConfigError, expand_env_vars};

// =============================================================================
// Constants
// =============================================================================

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Smallest accepted request timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 6;

/// Largest accepted request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 359;

/// Default number of collectors allowed to run at once.
pub const DEFAULT_MAX_COLLECTOR_CONCURRENCY: usize = 4;

/// Upper bound for `max_collector_concurrency`.
pub const MAX_COLLECTOR_CONCURRENCY: usize = 10;

/// Default capacity of the sample merge buffer.
pub const DEFAULT_MAX_COLLECTOR_BUFFER_SIZE: usize = 100;

/// Lower bound for `max_collector_buffer_size`.
pub const MIN_COLLECTOR_BUFFER_SIZE: usize = 10;

// =============================================================================
// Validated Target
// =============================================================================

/// URL scheme used to reach the appliance API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    /// Get the scheme as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl std::str::FromStr for Scheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication used for every request to a target.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// HTTP Basic credentials.
    Basic { username: String, password: String },
    /// API key sent in the `X-API-Key` header.
    Key { key: String },
}

impl Auth {
    /// Name of the auth method as written in the config file.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Key { .. } => "key",
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Key { .. } => f.debug_struct("Key").field("key", &"<redacted>").finish(),
        }
    }
}

/// A validated pfSense appliance to scrape.
#[derive(Debug, Clone)]
pub struct Target {
    /// Hostname or IP address, also the value of the `target` scrape parameter.
    pub host: String,
    /// API port.
    pub port: u16,
    /// URL scheme.
    pub scheme: Scheme,
    /// Authentication method and credentials.
    pub auth: Auth,
    /// Whether the TLS certificate of the appliance is verified.
    pub validate_cert: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional allow-list of collector names. `None` means every collector.
    pub collectors: Option<Vec<String>>,
    /// Maximum number of collectors performing requests at the same time.
    pub max_collector_concurrency: usize,
    /// Capacity of the merge buffer that collector samples flow through.
    pub max_collector_buffer_size: usize,
}

impl Target {
    /// Whether the named collector should run for this target.
    pub fn allows(&self, collector: &str) -> bool {
        self.collectors
            .as_ref()
            .is_none_or(|names| names.iter().any(|n| n == collector))
    }
}

// =============================================================================
// Raw Target Configuration
// =============================================================================

/// Target entry as written in the YAML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Hostname or IP address of the appliance (required).
    #[serde(default)]
    pub host: String,

    /// API port (required, 1-65535).
    #[serde(default)]
    pub port: u32,

    /// `http` or `https` (default: https).
    #[serde(default)]
    pub scheme: Option<String>,

    /// `basic` or `key`.
    #[serde(default)]
    pub auth_method: Option<String>,

    /// Username for basic auth. Supports `${VAR}` expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for basic auth. Supports `${VAR}` expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// API key for key auth. Supports `${VAR}` expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Verify the appliance TLS certificate (default: false).
    #[serde(default)]
    pub validate_cert: bool,

    /// Request timeout in seconds (default: 30, valid: 6-359).
    #[serde(default)]
    pub timeout: u64,

    /// Collectors to run for this target (default: all).
    #[serde(default)]
    pub collectors: Option<Vec<String>>,

    /// Collectors allowed to run concurrently (default: 4, valid: 1-10).
    #[serde(default)]
    pub max_collector_concurrency: usize,

    /// Merge buffer capacity (default: 100, minimum: 10).
    #[serde(default)]
    pub max_collector_buffer_size: usize,
}

impl TargetConfig {
    /// Apply defaults and validate into a [`Target`].
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` describing the first invalid field.
    pub fn validate(&self) -> Result<Target, ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid("target 'host' is a required field"));
        }
        let host = self.host.trim().to_string();

        let port = u16::try_from(self.port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| {
                ConfigError::invalid(format!(
                    "target 'port' must be between 1 and 65535 for host '{}'",
                    host
                ))
            })?;

        let scheme = match self.scheme.as_deref().map(str::trim) {
            None | Some("") => Scheme::default(),
            Some(s) => s.parse::<Scheme>().map_err(|_| {
                ConfigError::invalid(format!(
                    "target 'scheme' must be 'http' or 'https' for host '{}'",
                    host
                ))
            })?,
        };

        let auth = self.auth(&host)?;

        let timeout = match self.timeout {
            0 => DEFAULT_TIMEOUT_SECS,
            t => t,
        };
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout) {
            return Err(ConfigError::invalid(format!(
                "target 'timeout' must be between {} and {} seconds for host '{}'",
                MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, host
            )));
        }

        if self.validate_cert {
            tracing::debug!(host = %host, "Certificate validation enabled");
        } else {
            tracing::warn!(
                host = %host,
                "Certificate validation is disabled for target, credentials may be at risk"
            );
        }

        let max_collector_concurrency = match self.max_collector_concurrency {
            0 => DEFAULT_MAX_COLLECTOR_CONCURRENCY,
            n => n,
        };
        if max_collector_concurrency > MAX_COLLECTOR_CONCURRENCY {
            return Err(ConfigError::invalid(format!(
                "target 'max_collector_concurrency' must be between 1 and {} for host '{}'",
                MAX_COLLECTOR_CONCURRENCY, host
            )));
        }

        let max_collector_buffer_size = match self.max_collector_buffer_size {
            0 => DEFAULT_MAX_COLLECTOR_BUFFER_SIZE,
            n => n,
        };
        if max_collector_buffer_size < MIN_COLLECTOR_BUFFER_SIZE {
            return Err(ConfigError::invalid(format!(
                "target 'max_collector_buffer_size' must be at least {} for host '{}'",
                MIN_COLLECTOR_BUFFER_SIZE, host
            )));
        }

        let collectors = self
            .collectors
            .clone()
            .filter(|names| !names.is_empty());

        tracing::debug!(
            host = %host,
            auth = auth.method(),
            max_collector_concurrency,
            max_collector_buffer_size,
            "Target validated"
        );

        Ok(Target {
            host,
            port,
            scheme,
            auth,
            validate_cert: self.validate_cert,
            timeout: Duration::from_secs(timeout),
            collectors,
            max_collector_concurrency,
            max_collector_buffer_size,
        })
    }

    fn auth(&self, host: &str) -> Result<Auth, ConfigError> {
        let required = |value: &Option<String>, field: &str, method: &str| {
            value
                .as_deref()
                .map(expand_env_vars)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ConfigError::invalid(format!(
                        "target '{}' is required with auth_method '{}' on host '{}'",
                        field, method, host
                    ))
                })
        };

        match self.auth_method.as_deref() {
            Some("basic") => Ok(Auth::Basic {
                username: required(&self.username, "username", "basic")?,
                password: required(&self.password, "password", "basic")?,
            }),
            Some("key") => Ok(Auth::Key {
                key: required(&self.key, "key", "key")?,
            }),
            _ => Err(ConfigError::invalid(format!(
                "'auth_method' must be 'basic' or 'key' for host '{}'",
                host
            ))),
        }
    }
}
