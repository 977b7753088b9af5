// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role lookup settings.

use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Resolver configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
	/// Upper bound on one role lookup. Exceeding it commits the `student`
	/// fallback.
	pub timeout_ms: u64,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			timeout_ms: DEFAULT_TIMEOUT_MS,
		}
	}
}

impl ResolverConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.timeout_ms == 0 {
			return Err(ConfigError::Validation(
				"resolver.timeout_ms must be greater than zero".to_string(),
			));
		}
		Ok(())
	}
}

/// Resolver configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfigLayer {
	#[serde(default)]
	pub timeout_ms: Option<u64>,
}

impl ResolverConfigLayer {
	pub fn merge(&mut self, other: ResolverConfigLayer) {
		if other.timeout_ms.is_some() {
			self.timeout_ms = other.timeout_ms;
		}
	}

	pub fn finalize(self) -> ResolverConfig {
		ResolverConfig {
			timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
		}
	}
}
