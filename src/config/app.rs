//! Exporter configuration file and target lookup.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::target::{Target, TargetConfig};
use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default listen address.
pub const DEFAULT_ADDRESS: &str = "localhost";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 9945;

// =============================================================================
// Configuration File
// =============================================================================

/// Raw configuration document as written in YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Address the exporter binds to (default: "localhost").
    #[serde(default)]
    pub address: String,

    /// Port the exporter listens on (default: 9945).
    #[serde(default)]
    pub port: u16,

    /// Appliances that may be scraped.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl ConfigFile {
    /// Apply defaults and validate every field.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` for the first invalid field.
    pub fn validate(&self) -> Result<ExporterConfig, ConfigError> {
        let address = validate_address(&self.address)?;

        let port = match self.port {
            0 => DEFAULT_PORT,
            p => p,
        };

        let targets = self
            .targets
            .iter()
            .enumerate()
            .map(|(idx, target)| {
                target.validate().map_err(|e| {
                    ConfigError::invalid(format!("target {} ('{}'): {}", idx, target.host, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExporterConfig {
            address,
            port,
            targets,
        })
    }
}

/// Blank means [`DEFAULT_ADDRESS`]. Anything else must be an IP literal or
/// `localhost`.
fn validate_address(raw: &str) -> Result<String, ConfigError> {
    let address = match raw.trim() {
        "" => DEFAULT_ADDRESS.to_string(),
        a => a.to_string(),
    };
    if address != DEFAULT_ADDRESS && address.parse::<IpAddr>().is_err() {
        return Err(ConfigError::invalid(format!(
            "global 'address' must be a valid IP address or 'localhost', got '{}'",
            address
        )));
    }
    Ok(address)
}

/// Validated exporter configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Listen address.
    pub address: String,
    /// Listen port.
    pub port: u16,
    /// Validated scrape targets, in file order.
    pub targets: Vec<Target>,
}

impl ExporterConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        file.validate()
    }

    /// Apply command-line overrides. The address goes through the same
    /// check as the file value and a zero port falls back to the default.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` for an invalid address.
    pub fn with_overrides(
        mut self,
        address: Option<String>,
        port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        if let Some(address) = address {
            self.address = validate_address(&address)?;
        }
        if let Some(port) = port {
            self.port = if port == 0 { DEFAULT_PORT } else { port };
        }
        Ok(self)
    }

    /// `address:port` string suitable for binding a listener.
    pub fn listen_addr(&self) -> String {
        match self.address.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.address, self.port),
        }
    }
}

// =============================================================================
// Target Resolver
// =============================================================================

/// Maps the `target` scrape parameter to a configured [`Target`].
#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    targets: Vec<Arc<Target>>,
}

impl TargetResolver {
    /// Create a resolver over validated targets.
    pub fn new(targets: impl IntoIterator<Item = Target>) -> Self {
        Self {
            targets: targets.into_iter().map(Arc::new).collect(),
        }
    }

    /// Look up a target by host. The first configured match wins.
    pub fn resolve(&self, host: &str) -> Option<Arc<Target>> {
        self.targets.iter().find(|t| t.host == host).cloned()
    }

    /// Number of configured targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are configured.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
address: 127.0.0.1
port: 9100
targets:
  - host: fw1.example.com
    port: 443
    auth_method: basic
    username: admin
    password: pfsense
    validate_cert: true
    collectors: [system, gateways]
  - host: 10.0.0.1
    port: 8443
    scheme: http
    auth_method: key
    key: abc123
    timeout: 10
    max_collector_concurrency: 2
    max_collector_buffer_size: 50
"#;

    #[test]
    fn test_address_override_is_validated() {
        let config = ExporterConfig::from_yaml(SAMPLE_CONFIG).unwrap();
        let err = config
            .with_overrides(Some("not-an-ip".to_string()), None)
            .unwrap_err();
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn test_overrides_applied() {
        let config = ExporterConfig::from_yaml(SAMPLE_CONFIG)
            .unwrap()
            .with_overrides(Some("::1".to_string()), Some(9200))
            .unwrap();
        assert_eq!(config.address, "::1");
        assert_eq!(config.port, 9200);
        assert_eq!(config.listen_addr(), "[::1]:9200");

        let config = config
            .with_overrides(Some("  ".to_string()), Some(0))
            .unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.port, DEFAULT_PORT);

        let config = config.with_overrides(None, None).unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn test_config_from_yaml() {
        let config = ExporterConfig::from_yaml(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 9100);
        assert_eq!(config.targets.len(), 2);

        let fw1 = &config.targets[0];
        assert!(fw1.validate_cert);
        assert_eq!(
            fw1.collectors,
            Some(vec!["system".to_string(), "gateways".to_string()])
        );

        let fw2 = &config.targets[1];
        assert_eq!(fw2.timeout.as_secs(), 10);
        assert_eq!(fw2.max_collector_concurrency, 2);
        assert_eq!(fw2.max_collector_buffer_size, 50);
    }

    #[test]
    fn test_config_defaults() {
        let config = ExporterConfig::from_yaml("targets: []").unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.listen_addr(), "localhost:9945");
    }

    #[test]
    fn test_config_invalid_address() {
        let result = ExporterConfig::from_yaml("address: not-an-ip\n");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("global 'address'")
        );
    }

    #[test]
    fn test_config_ipv6_listen_addr() {
        let config = ExporterConfig::from_yaml("address: '::1'\nport: 9945\n").unwrap();
        assert_eq!(config.listen_addr(), "[::1]:9945");
    }

    #[test]
    fn test_config_invalid_target_reports_index() {
        let yaml = r#"
targets:
  - host: fw1
    port: 443
    auth_method: key
"#;
        let err = ExporterConfig::from_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains("target 0 ('fw1')"), "{}", err);
    }

    #[test]
    fn test_config_parse_error() {
        let result = ExporterConfig::from_yaml("targets: {not: [a list");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let config = ExporterConfig::load(&path).unwrap();
        assert_eq!(config.targets.len(), 2);
    }

    #[test]
    fn test_config_load_missing_file() {
        let result = ExporterConfig::load("/nonexistent/pfsense-exporter.yml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_resolver_lookup() {
        let config = ExporterConfig::from_yaml(SAMPLE_CONFIG).unwrap();
        let resolver = TargetResolver::new(config.targets);

        assert_eq!(resolver.len(), 2);
        assert_eq!(resolver.resolve("10.0.0.1").unwrap().port, 8443);
        assert!(resolver.resolve("fw3.example.com").is_none());
        assert!(resolver.resolve("").is_none());
    }
}
