//! Configuration module for the confirmation service.
//!
//! Loads service configuration from TOML files, resolves environment
//! variable references in string values, and validates that every
//! section is coherent before anything starts polling.

use confirmer_types::StacksNetwork;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump toml attaches to it
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the confirmation service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Service identity and target network.
	pub confirmer: ConfirmerConfig,
	/// Poll loop tuning and abort policy overrides.
	#[serde(default)]
	pub poller: PollerConfig,
	/// HTTP API server settings.
	#[serde(default)]
	pub api: ApiConfig,
}

/// Service identity and network selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmerConfig {
	/// Unique identifier for this service instance.
	pub id: String,
	/// Which Stacks network the status endpoints belong to.
	#[serde(default)]
	pub network: StacksNetwork,
}

/// Poll loop tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerConfig {
	/// Total wall-clock budget for one poll, in seconds.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
	/// Delay between successive status checks, in seconds.
	#[serde(default = "default_interval_seconds")]
	pub interval_seconds: u64,
	/// Overrides the default benign abort-reason patterns when set.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub benign_abort_patterns: Option<Vec<String>>,
}

impl Default for PollerConfig {
	fn default() -> Self {
		Self {
			timeout_seconds: default_timeout_seconds(),
			interval_seconds: default_interval_seconds(),
			benign_abort_patterns: None,
		}
	}
}

/// Returns the default overall poll budget in seconds (5 minutes).
fn default_timeout_seconds() -> u64 {
	300
}

/// Returns the default inter-poll delay in seconds.
fn default_interval_seconds() -> u64 {
	5
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Shared-secret bearer token required on verification requests.
	/// Requests are unauthenticated when unset.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub auth_token: Option<String>,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			auth_token: None,
		}
	}
}

/// Returns the default API host (localhost).
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable
/// VAR_NAME. Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).expect("capture group 0 always exists");
		let var_name = &cap[1];

		result.push_str(&input[last_end..full_match.start()]);
		match std::env::var(var_name) {
			Ok(value) => result.push_str(&value),
			Err(_) => match cap.get(2) {
				Some(default_value) => result.push_str(default_value.as_str()),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		}
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables are resolved and the configuration is
	/// validated before it is returned.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	///
	/// - Service id must be non-empty
	/// - Poll timeout and interval must be positive, interval <= timeout
	/// - Benign abort patterns must compile as regexes
	/// - API host must be non-empty and port non-zero
	fn validate(&self) -> Result<(), ConfigError> {
		if self.confirmer.id.is_empty() {
			return Err(ConfigError::Validation("Service id cannot be empty".into()));
		}

		if self.poller.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"Poller timeout_seconds must be greater than 0".into(),
			));
		}
		if self.poller.interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"Poller interval_seconds must be greater than 0".into(),
			));
		}
		if self.poller.interval_seconds > self.poller.timeout_seconds {
			return Err(ConfigError::Validation(format!(
				"Poller interval_seconds ({}) cannot exceed timeout_seconds ({})",
				self.poller.interval_seconds, self.poller.timeout_seconds
			)));
		}

		if let Some(patterns) = &self.poller.benign_abort_patterns {
			for pattern in patterns {
				Regex::new(pattern).map_err(|e| {
					ConfigError::Validation(format!(
						"Invalid benign abort pattern '{}': {}",
						pattern, e
					))
				})?;
			}
		}

		if self.api.host.is_empty() {
			return Err(ConfigError::Validation("API host cannot be empty".into()));
		}
		if self.api.port == 0 {
			return Err(ConfigError::Validation(
				"API port must be greater than 0".into(),
			));
		}
		if let Some(token) = &self.api.auth_token {
			if token.is_empty() {
				return Err(ConfigError::Validation(
					"API auth_token cannot be empty when set".into(),
				));
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("CONFIRMER_TEST_HOST", "localhost");
		std::env::set_var("CONFIRMER_TEST_PORT", "8999");

		let input = "host = \"${CONFIRMER_TEST_HOST}:${CONFIRMER_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:8999\"");

		std::env::remove_var("CONFIRMER_TEST_HOST");
		std::env::remove_var("CONFIRMER_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${CONFIRMER_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${CONFIRMER_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("CONFIRMER_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = r#"
[confirmer]
id = "donations-confirmer"
"#
		.parse()
		.unwrap();

		assert_eq!(config.confirmer.network, StacksNetwork::Mainnet);
		assert_eq!(config.poller.timeout_seconds, 300);
		assert_eq!(config.poller.interval_seconds, 5);
		assert!(config.poller.benign_abort_patterns.is_none());
		assert_eq!(config.api.host, "127.0.0.1");
		assert_eq!(config.api.port, 3000);
		assert!(config.api.auth_token.is_none());
	}

	#[test]
	fn test_full_config_parses() {
		std::env::set_var("CONFIRMER_TEST_TOKEN", "hunter2");

		let config: Config = r#"
[confirmer]
id = "donations-confirmer"
network = "testnet"

[poller]
timeout_seconds = 120
interval_seconds = 3
benign_abort_patterns = ["\\bu5\\b", "\\bu104\\b"]

[api]
host = "0.0.0.0"
port = 8080
auth_token = "${CONFIRMER_TEST_TOKEN}"
"#
		.parse()
		.unwrap();

		assert_eq!(config.confirmer.network, StacksNetwork::Testnet);
		assert_eq!(config.poller.timeout_seconds, 120);
		assert_eq!(
			config.poller.benign_abort_patterns.as_deref().unwrap().len(),
			2
		);
		assert_eq!(config.api.auth_token.as_deref(), Some("hunter2"));

		std::env::remove_var("CONFIRMER_TEST_TOKEN");
	}

	#[test]
	fn test_empty_id_rejected() {
		let result: Result<Config, _> = r#"
[confirmer]
id = ""
"#
		.parse();
		assert!(result.is_err());
	}

	#[test]
	fn test_zero_interval_rejected() {
		let result: Result<Config, _> = r#"
[confirmer]
id = "test"

[poller]
interval_seconds = 0
"#
		.parse();
		let err = result.unwrap_err();
		assert!(err.to_string().contains("interval_seconds"));
	}

	#[test]
	fn test_interval_exceeding_timeout_rejected() {
		let result: Result<Config, _> = r#"
[confirmer]
id = "test"

[poller]
timeout_seconds = 10
interval_seconds = 30
"#
		.parse();
		let err = result.unwrap_err();
		assert!(err.to_string().contains("cannot exceed timeout_seconds"));
	}

	#[test]
	fn test_invalid_benign_pattern_rejected() {
		let result: Result<Config, _> = r#"
[confirmer]
id = "test"

[poller]
benign_abort_patterns = ["(unclosed"]
"#
		.parse();
		let err = result.unwrap_err();
		assert!(err.to_string().contains("Invalid benign abort pattern"));
	}

	#[test]
	fn test_unknown_network_rejected() {
		let result: Result<Config, _> = r#"
[confirmer]
id = "test"
network = "devnet"
"#
		.parse();
		assert!(result.is_err());
	}

	#[tokio::test]
	async fn test_from_file() {
		let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
		let config_path = temp_dir.path().join("confirmer.toml");
		std::fs::write(
			&config_path,
			r#"
[confirmer]
id = "file-confirmer"
network = "testnet"
"#,
		)
		.expect("Failed to write config");

		let config = Config::from_file(config_path.to_str().unwrap())
			.await
			.expect("Failed to load config");
		assert_eq!(config.confirmer.id, "file-confirmer");
		assert_eq!(config.confirmer.network, StacksNetwork::Testnet);
	}

	#[tokio::test]
	async fn test_from_missing_file_is_io_error() {
		let result = Config::from_file("/nonexistent/confirmer.toml").await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
