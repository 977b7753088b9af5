// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the authorization crate.
//!
//! Authorization questions themselves never fail: [`crate::Access::can`]
//! always answers with a boolean. These errors cover the edges of the crate,
//! where strings and JSON from callers are turned into typed values and where
//! custom policy tables are assembled.

use thiserror::Error;

use crate::types::{Resource, Role};

/// Errors raised while building typed authorization inputs.
#[derive(Debug, Error)]
pub enum AuthzError {
	/// A string did not name a known role, resource or action.
	#[error("unknown {kind}: '{value}'")]
	UnknownVariant { kind: &'static str, value: String },

	/// A permission rule was declared with no actions.
	#[error("rule for role {role} on {resource} grants no actions")]
	EmptyActionSet { role: Role, resource: Resource },

	/// The resource kind carries no per-instance attributes.
	#[error("resource {0} has no instance attributes")]
	NoInstanceAttributes(Resource),

	/// Instance attributes could not be decoded for the resource kind.
	#[error("invalid attributes for {resource}: {source}")]
	InvalidResourceData {
		resource: Resource,
		#[source]
		source: serde_json::Error,
	},
}

pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_variant_names_the_kind() {
		let err = AuthzError::UnknownVariant {
			kind: "role",
			value: "owner".to_string(),
		};
		assert_eq!(err.to_string(), "unknown role: 'owner'");
	}

	#[test]
	fn empty_action_set_mentions_rule() {
		let err = AuthzError::EmptyActionSet {
			role: Role::Student,
			resource: Resource::Course,
		};
		assert_eq!(
			err.to_string(),
			"rule for role student on course grants no actions"
		);
	}
}
