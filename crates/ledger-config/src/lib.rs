//! Configuration module for the order ledger service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required values are properly set.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use ledger_types::{MenuItem, Restaurant, User, UserRole};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
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
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the order ledger service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
	/// Catalog and identity records written into storage at startup.
	pub seed: Option<SeedConfig>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	8080
}

/// Returns the default API timeout in seconds.
fn default_api_timeout() -> u64 {
	30
}

/// Catalog and identity records to upsert into storage at startup.
///
/// The browsing/administration surfaces that would normally maintain
/// these records live outside this repository, so the seed section is
/// the way to populate a fresh instance with users, restaurants, and
/// menus. Seeding is idempotent: records are plain upserts by id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedConfig {
	/// Users to upsert.
	#[serde(default)]
	pub users: Vec<User>,
	/// Restaurants to upsert.
	#[serde(default)]
	pub restaurants: Vec<Restaurant>,
	/// Menu items to upsert.
	#[serde(default)]
	pub menu_items: Vec<MenuItem>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with environment variable resolution.
	///
	/// This method supports modular configuration through include directives:
	/// - `include = ["file1.toml", "file2.toml"]` - Include specific files
	///
	/// Each top-level section must be unique across all configuration files.
	/// The loaded configuration is validated before it is returned.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method checks that:
	/// - the service id is not empty
	/// - a storage backend is configured and the primary exists
	/// - seed records are internally consistent (unique ids, restaurant
	///   owners carry the owner role, menu items reference seeded
	///   restaurants)
	pub fn validate(&self) -> Result<(), ConfigError> {
		// Validate service config
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate seed records if present
		if let Some(ref seed) = self.seed {
			Self::validate_seed(seed)?;
		}

		Ok(())
	}

	/// Validates the internal consistency of the seed section.
	fn validate_seed(seed: &SeedConfig) -> Result<(), ConfigError> {
		let mut user_roles = HashMap::new();
		for user in &seed.users {
			if user.id.is_empty() {
				return Err(ConfigError::Validation("Seed user id cannot be empty".into()));
			}
			if user_roles.insert(user.id.clone(), user.role).is_some() {
				return Err(ConfigError::Validation(format!(
					"Duplicate seed user id '{}'",
					user.id
				)));
			}
		}

		let mut restaurant_ids = HashSet::new();
		for restaurant in &seed.restaurants {
			if !restaurant_ids.insert(restaurant.id.clone()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate seed restaurant id '{}'",
					restaurant.id
				)));
			}
			match user_roles.get(&restaurant.owner_id) {
				Some(UserRole::RestaurantOwner) => {},
				Some(role) => {
					return Err(ConfigError::Validation(format!(
						"Restaurant '{}' owner '{}' has role '{}', expected restaurant_owner",
						restaurant.id, restaurant.owner_id, role
					)));
				},
				None => {
					return Err(ConfigError::Validation(format!(
						"Restaurant '{}' references unknown owner '{}'",
						restaurant.id, restaurant.owner_id
					)));
				},
			}
		}

		let mut menu_item_ids = HashSet::new();
		for item in &seed.menu_items {
			if !menu_item_ids.insert(item.id.clone()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate seed menu item id '{}'",
					item.id
				)));
			}
			if !restaurant_ids.contains(&item.restaurant_id) {
				return Err(ConfigError::Validation(format!(
					"Menu item '{}' references unknown restaurant '{}'",
					item.id, item.restaurant_id
				)));
			}
			if item.price.is_sign_negative() {
				return Err(ConfigError::Validation(format!(
					"Menu item '{}' has a negative price",
					item.id
				)));
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the standard
/// string parsing interface. Environment variables are resolved and the
/// configuration is automatically validated after parsing.
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

	fn minimal_config() -> Config {
		let content = r#"
[service]
id = "test-ledger"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;
		toml::from_str(content).unwrap()
	}

	#[test]
	fn test_minimal_config_validates() {
		let config = minimal_config();
		assert!(config.validate().is_ok());
		assert_eq!(config.service.id, "test-ledger");
		assert_eq!(config.storage.primary, "memory");
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let mut config = minimal_config();
		config.storage.primary = "file".to_string();

		let err = config.validate().unwrap_err().to_string();
		assert!(err.contains("Primary storage 'file' not found"));
	}

	#[test]
	fn test_seed_owner_role_enforced() {
		let content = r#"
[service]
id = "test-ledger"

[storage]
primary = "memory"
[storage.implementations.memory]

[[seed.users]]
id = "u1"
name = "Casey"
role = "customer"

[[seed.restaurants]]
id = "r1"
owner_id = "u1"
name = "Spice Garden"
address = "1 Main St"
is_active = true
"#;
		let config: Config = toml::from_str(content).unwrap();

		let err = config.validate().unwrap_err().to_string();
		assert!(err.contains("expected restaurant_owner"));
	}

	#[test]
	fn test_seed_menu_item_needs_restaurant() {
		let content = r#"
[service]
id = "test-ledger"

[storage]
primary = "memory"
[storage.implementations.memory]

[[seed.menu_items]]
id = "m1"
restaurant_id = "missing"
name = "Pad Thai"
price = "9.50"
is_available = true
"#;
		let config: Config = toml::from_str(content).unwrap();

		let err = config.validate().unwrap_err().to_string();
		assert!(err.contains("unknown restaurant"));
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("LEDGER_TEST_HOST", "0.0.0.0");

		let resolved = resolve_env_vars("host = \"${LEDGER_TEST_HOST}\"").unwrap();
		assert_eq!(resolved, "host = \"0.0.0.0\"");

		let with_default = resolve_env_vars("port = ${LEDGER_TEST_MISSING:-8080}").unwrap();
		assert_eq!(with_default, "port = 8080");

		let missing = resolve_env_vars("id = \"${LEDGER_TEST_MISSING_NO_DEFAULT}\"");
		assert!(missing.is_err());
	}
}
