//! Configuration management for MockStack.
//!
//! All configuration is driven by environment variables, matching LocalStack conventions.

use crate::error::MockStackResult;
use crate::types::{AccountId, AwsRegion};

/// Global configuration for MockStack.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockStackConfig {
    /// Bind address for the gateway.
    pub gateway_listen: String,
    /// Region used when a request does not carry one.
    pub default_region: AwsRegion,
    /// Account ID used when synthesizing ARNs.
    pub account_id: AccountId,
    /// Log level.
    pub log_level: String,
    /// Emit logs as JSON lines instead of text (`LOG_FORMAT=json`).
    pub log_json: bool,
    /// Explicitly enabled services. Empty means every compiled-in service.
    pub services: Vec<String>,
}

impl Default for MockStackConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:4566".to_owned(),
            default_region: AwsRegion::default(),
            account_id: AccountId::default(),
            log_level: "info".to_owned(),
            log_json: false,
            services: Vec::new(),
        }
    }
}

impl MockStackConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if `ACCOUNT_ID` is set to something other than a
    /// 12-digit account number.
    pub fn from_env() -> MockStackResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MockStackResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("DEFAULT_REGION") {
            config.default_region = AwsRegion::new(v);
        }
        if let Some(v) = lookup("ACCOUNT_ID") {
            config.account_id = AccountId::new(v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            config.log_json = v.trim().eq_ignore_ascii_case("json");
        }
        if let Some(v) = lookup("SERVICES") {
            config.services = parse_services(&v);
        }

        Ok(config)
    }

    /// Whether `name` is enabled by the `SERVICES` setting.
    #[must_use]
    pub fn is_service_enabled(&self, name: &str) -> bool {
        self.services.is_empty() || self.services.iter().any(|s| s == name)
    }
}

/// Parse a comma-separated services string into lowercase service names.
fn parse_services(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_should_create_default_config() {
        let config = MockStackConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:4566");
        assert_eq!(config.default_region.as_str(), "us-east-1");
        assert_eq!(config.account_id.as_str(), "000000000000");
        assert!(config.services.is_empty());
        assert!(!config.log_json);
    }

    #[test]
    fn test_should_switch_to_json_logs() {
        let config = MockStackConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "JSON")])).unwrap();
        assert!(config.log_json);

        let config = MockStackConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "text")])).unwrap();
        assert!(!config.log_json);
    }

    #[test]
    fn test_should_read_overrides() {
        let config = MockStackConfig::from_lookup(lookup_from(&[
            ("DEFAULT_REGION", "eu-central-1"),
            ("ACCOUNT_ID", "123456789012"),
            ("SERVICES", " Batch, sns ,,"),
        ]))
        .unwrap();
        assert_eq!(config.default_region.as_str(), "eu-central-1");
        assert_eq!(config.account_id.as_str(), "123456789012");
        assert_eq!(config.services, vec!["batch", "sns"]);
        assert!(config.is_service_enabled("sns"));
        assert!(!config.is_service_enabled("ecs"));
    }

    #[test]
    fn test_should_reject_malformed_account_id() {
        let result = MockStackConfig::from_lookup(lookup_from(&[("ACCOUNT_ID", "42")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_should_enable_everything_when_services_empty() {
        let config = MockStackConfig::from_lookup(lookup_from(&[("SERVICES", "  ")])).unwrap();
        assert!(config.is_service_enabled("batch"));
        assert!(config.is_service_enabled("ecs"));
    }
}
