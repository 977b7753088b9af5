// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The `can` decision procedure.
//!
//! [`evaluate`] is a pure function of the policy table, the subject's cache,
//! the subject, and the optional instance attributes. It runs in two phases:
//!
//! 1. **Coarse check**: is `action` on `resource` in the role's cache at all?
//! 2. **Fine check**: if the caller supplied instance data, every condition
//!    attached to a matching rule must hold.
//!
//! `SuperAdmin` short-circuits both phases.
//!
//! # Combining conditions
//!
//! When several rules for the same `(role, resource, action)` carry
//! conditions, all of them must pass (logical AND), not any one of them.
//! Switching to OR would be a policy change; the `conditions_combine_with_and`
//! test pins the current behavior.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::cache::PermissionCache;
use crate::policy::PolicyTable;
use crate::resource::ResourceData;
use crate::types::{Action, Resource, Role, Subject};

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionReason {
	/// The subject is a super administrator.
	SuperAdminBypass,
	/// No rule for the role grants the action on the resource.
	NotGranted,
	/// Granted coarsely and the caller supplied no instance to check.
	CoarseGrant,
	/// Granted and no matching rule carries a condition.
	Unconditional,
	/// Every condition on the matching rules held.
	ConditionsMet,
	/// The named condition failed or could not read its attributes.
	ConditionFailed { condition: &'static str },
}

/// The outcome of one authorization question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
	pub allowed: bool,
	pub reason: DecisionReason,
}

impl Decision {
	fn allow(reason: DecisionReason) -> Self {
		Self {
			allowed: true,
			reason,
		}
	}

	fn deny(reason: DecisionReason) -> Self {
		Self {
			allowed: false,
			reason,
		}
	}
}

/// Decide whether `subject` may perform `action` on `resource`.
///
/// `cache` must have been built from `table` for `subject.role`. Never fails:
/// unknown combinations and unreadable attributes are plain denials.
#[instrument(
	level = "debug",
	skip(table, cache, subject, data),
	fields(
		role = %subject.role,
		action = %action,
		resource = %resource,
		has_data = data.is_some(),
	)
)]
pub fn evaluate(
	table: &PolicyTable,
	cache: &PermissionCache,
	subject: &Subject,
	action: Action,
	resource: Resource,
	data: Option<&ResourceData>,
) -> Decision {
	if subject.role == Role::SuperAdmin {
		return Decision::allow(DecisionReason::SuperAdminBypass);
	}

	if !cache.has(resource, action) {
		debug!("denied: not in permission cache");
		return Decision::deny(DecisionReason::NotGranted);
	}

	let Some(data) = data else {
		return Decision::allow(DecisionReason::CoarseGrant);
	};

	let mut checked = 0usize;
	for condition in table.conditions_for(subject.role, resource, action) {
		checked += 1;
		match condition.test(subject, data) {
			Some(true) => {}
			Some(false) => {
				debug!(condition = condition.name(), "denied: condition failed");
				return Decision::deny(DecisionReason::ConditionFailed {
					condition: condition.name(),
				});
			}
			None => {
				debug!(
					condition = condition.name(),
					"denied: condition attributes missing"
				);
				return Decision::deny(DecisionReason::ConditionFailed {
					condition: condition.name(),
				});
			}
		}
	}

	if checked == 0 {
		Decision::allow(DecisionReason::Unconditional)
	} else {
		Decision::allow(DecisionReason::ConditionsMet)
	}
}
