// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for campus-authz deployments.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`CAMPUS_AUTHZ_*`)
//!
//! # Usage
//!
//! ```ignore
//! use campus_authz_config::load_config;
//!
//! let config = load_config()?;
//! let pool = campus_authz_db::create_pool(&config.database.url).await?;
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::AuthzConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::debug;

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthzConfig {
	pub database: DatabaseConfig,
	pub resolver: ResolverConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`CAMPUS_AUTHZ_*`)
/// 2. Config file (`/etc/campus/authz.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<AuthzConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<AuthzConfig, ConfigError> {
	let mut merged = AuthzConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<AuthzConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge `sources` in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<AuthzConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = AuthzConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: AuthzConfigLayer) -> Result<AuthzConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let resolver = layer.resolver.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	resolver.validate()?;

	debug!(
		database = %database.url,
		resolver_timeout_ms = resolver.timeout_ms,
		log_level = %logging.level,
		"authz configuration finalized"
	);

	Ok(AuthzConfig {
		database,
		resolver,
		logging,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	struct FixedSource(Precedence, &'static str);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<AuthzConfigLayer, ConfigError> {
			Ok(toml::from_str(self.1).unwrap())
		}
	}

	#[test]
	fn test_defaults_only() {
		let config = load_from_sources(vec![Box::new(DefaultsSource)]).unwrap();
		assert_eq!(config, AuthzConfig::default());
		assert_eq!(config.database.url, "sqlite:./campus.db");
		assert_eq!(config.resolver.timeout_ms, 2000);
		assert_eq!(config.logging.level, "info");
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let config = load_from_sources(vec![
			Box::new(FixedSource(Precedence::Environment, "[resolver]\ntimeout_ms = 900")),
			Box::new(FixedSource(Precedence::ConfigFile, "[resolver]\ntimeout_ms = 100")),
			Box::new(DefaultsSource),
		])
		.unwrap();
		assert_eq!(config.resolver.timeout_ms, 900);
	}

	#[test]
	fn test_zero_timeout_fails_validation() {
		let err = load_from_sources(vec![Box::new(FixedSource(
			Precedence::ConfigFile,
			"[resolver]\ntimeout_ms = 0",
		))])
		.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_load_with_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[database]\nurl = \"sqlite:/srv/roles.db\"").unwrap();

		let config = load_config_with_file(file.path()).unwrap();
		if std::env::var("CAMPUS_AUTHZ_DATABASE_URL").is_err() {
			assert_eq!(config.database.url, "sqlite:/srv/roles.db");
		}
	}
}
