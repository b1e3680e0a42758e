use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalConfig {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_directory: Option<PathBuf>,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Fixed delay applied before every store operation.
    #[serde(default)]
    pub simulated_latency_ms: u64,
    /// Largest blob a single collection key may hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_quota_bytes: Option<usize>,
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            data_directory: None,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            simulated_latency_ms: 0,
            storage_quota_bytes: None,
        }
    }
}

impl PortalConfig {
    /// Resolved data directory: the configured one, else
    /// `~/.partner-portal/data`.
    pub fn data_directory(&self) -> Option<PathBuf> {
        self.data_directory
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".partner-portal").join("data")))
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Caps a requested page size at `max_page_size`, falling back to the
    /// default when none was requested. Zero passes through untouched so
    /// `PageRequest::new` rejects it like a zero page.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: PortalConfig = serde_json::from_str(r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.simulated_latency(), Duration::ZERO);
        assert!(config.storage_quota_bytes.is_none());
    }

    #[test]
    fn test_page_size_resolution() {
        let config = PortalConfig::default();
        assert_eq!(config.page_size(None), 20);
        assert_eq!(config.page_size(Some(5)), 5);
        assert_eq!(config.page_size(Some(0)), 0);
        assert_eq!(config.page_size(Some(1000)), 100);
    }

    #[test]
    fn test_explicit_data_directory_wins() {
        let config = PortalConfig {
            data_directory: Some(PathBuf::from("/srv/portal")),
            ..Default::default()
        };
        assert_eq!(config.data_directory(), Some(PathBuf::from("/srv/portal")));
    }

    #[test]
    fn test_camel_case_round_trip_keys() {
        let config = PortalConfig {
            simulated_latency_ms: 300,
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["simulatedLatencyMs"], 300);
        assert_eq!(json["defaultPageSize"], 20);
        assert!(json.get("dataDirectory").is_none());
    }
}
