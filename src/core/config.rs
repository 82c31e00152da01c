use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub detectors: HashMap<String, DetectorSettings>,
}

impl Config {
    /// Load from the first readable candidate path, falling back to
    /// defaults when none exists.
    pub fn load() -> Result<Config> {
        let candidates = ["config/default.toml", "default.toml", ".leakscan.toml"];

        for path in candidates {
            if Path::new(path).exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str(&contents) {
                        Ok(config) => {
                            info!("Loaded config from {}", path);
                            return Ok(config);
                        }
                        Err(e) => warn!("Failed to parse config from {}: {}", path, e),
                    },
                    Err(e) => warn!("Failed to read config from {}: {}", path, e),
                }
            }
        }

        Ok(Config::default())
    }

    /// Whether a detector is enabled; detectors without an entry are on.
    pub fn detector_enabled(&self, name: &str) -> bool {
        self.detectors.get(name).map_or(true, |d| d.enabled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Cap on concurrently running chunk/detector verification tasks.
    pub max_concurrent: usize,
    /// Outbound verification requests per second.
    pub requests_per_second: u32,
    /// Permit loopback/link-local/private destinations. Off outside of
    /// tests; verification endpoints are public services.
    pub allow_local_addresses: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_concurrent: 8,
            requests_per_second: 5,
            allow_local_addresses: false,
        }
    }
}

impl VerifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSettings {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.verifier.timeout(), Duration::from_secs(10));
        assert!(!config.verifier.allow_local_addresses);
        assert!(config.detector_enabled("shodan"));
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [verifier]
            timeout_ms = 2000
            max_concurrent = 2
            requests_per_second = 1
            allow_local_addresses = true

            [detectors.shopify]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.verifier.timeout_ms, 2000);
        assert!(!config.detector_enabled("shopify"));
        assert!(config.detector_enabled("shodan"));
    }

    #[test]
    fn missing_verifier_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("[verifier]\ntimeout_ms = 500\n").unwrap();
        assert_eq!(config.verifier.timeout_ms, 500);
        assert_eq!(config.verifier.max_concurrent, 8);
    }
}
