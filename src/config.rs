//! Runtime configuration.
//!
//! Defaults, overlaid by `PRODUCT_CODE_*` environment variables, overlaid by
//! CLI flags in the binary.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

pub const CATALOG_ENV: &str = "PRODUCT_CODE_CATALOG";
pub const MAX_ATTEMPTS_ENV: &str = "PRODUCT_CODE_MAX_ATTEMPTS";

/// Configuration for the catalog service and CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Path to the JSON catalog file (default: catalog.json)
	pub catalog_path: PathBuf,
	/// Attempts at generating a unique product code before giving up (default: 5)
	pub max_code_attempts: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			catalog_path: PathBuf::from("catalog.json"),
			max_code_attempts: 5,
		}
	}
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid value {value:?} for {key}: {reason}")]
	Invalid {
		key: &'static str,
		value: String,
		reason: String,
	},
}

impl Config {
	/// Defaults with environment overrides applied.
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut config = Self::default();

		if let Some(path) = var(CATALOG_ENV) {
			config.catalog_path = PathBuf::from(path);
		}
		if let Some(attempts) = try_load::<usize>(MAX_ATTEMPTS_ENV)? {
			if attempts == 0 {
				return Err(ConfigError::Invalid {
					key: MAX_ATTEMPTS_ENV,
					value: attempts.to_string(),
					reason: "must be at least 1".to_string(),
				});
			}
			config.max_code_attempts = attempts;
		}

		Ok(config)
	}
}

fn var(key: &str) -> Option<String> {
	match env::var(key) {
		Ok(value) => Some(value),
		Err(env::VarError::NotPresent) => {
			debug!("{key} not set, using default");
			None
		}
		Err(e) => {
			warn!("Ignoring {key}: {e}");
			None
		}
	}
}

fn try_load<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError>
where
	T::Err: Display,
{
	let Some(raw) = var(key) else {
		return Ok(None);
	};

	raw.trim()
		.parse()
		.map(Some)
		.map_err(|e: T::Err| ConfigError::Invalid {
			key,
			value: raw.clone(),
			reason: e.to_string(),
		})
}
