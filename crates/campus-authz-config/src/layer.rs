// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partial configuration every source produces.

use serde::Deserialize;

use crate::sections::{DatabaseConfigLayer, LoggingConfigLayer, ResolverConfigLayer};

/// All sections, each optional. Deserialized directly from the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthzConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub resolver: Option<ResolverConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl AuthzConfigLayer {
	/// Overlay `other` on top of `self`. Fields set in `other` win.
	pub fn merge(&mut self, other: AuthzConfigLayer) {
		if let Some(database) = other.database {
			self.database.get_or_insert_with(Default::default).merge(database);
		}
		if let Some(resolver) = other.resolver {
			self.resolver.get_or_insert_with(Default::default).merge(resolver);
		}
		if let Some(logging) = other.logging {
			self.logging.get_or_insert_with(Default::default).merge(logging);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_keeps_unset_fields() {
		let mut base: AuthzConfigLayer = toml::from_str(
			r#"
			[database]
			url = "sqlite:/srv/campus.db"

			[resolver]
			timeout_ms = 500
			"#,
		)
		.unwrap();

		let overlay: AuthzConfigLayer = toml::from_str(
			r#"
			[resolver]
			timeout_ms = 750
			"#,
		)
		.unwrap();

		base.merge(overlay);
		assert_eq!(
			base.database.and_then(|d| d.url).as_deref(),
			Some("sqlite:/srv/campus.db")
		);
		assert_eq!(base.resolver.and_then(|r| r.timeout_ms), Some(750));
		assert!(base.logging.is_none());
	}

	#[test]
	fn test_empty_toml_is_empty_layer() {
		let layer: AuthzConfigLayer = toml::from_str("").unwrap();
		assert!(layer.database.is_none());
		assert!(layer.resolver.is_none());
		assert!(layer.logging.is_none());
	}
}
