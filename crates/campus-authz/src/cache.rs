// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-role index of coarse grants.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::policy::PolicyTable;
use crate::types::{Action, Resource, Role};

/// `resource -> actions` for exactly one role.
///
/// After a build, the entry for each resource is the union of the action sets
/// of every rule declared for that role and resource. Conditions are ignored
/// here; they only matter in the fine check. Ordered maps keep the layout
/// deterministic, so two builds for the same role compare and serialize
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCache {
	role: Role,
	grants: BTreeMap<Resource, BTreeSet<Action>>,
}

impl Default for PermissionCache {
	fn default() -> Self {
		Self::empty()
	}
}

impl PermissionCache {
	/// An empty cache for [`Role::Guest`], the state before any initialization.
	pub fn empty() -> Self {
		Self {
			role: Role::Guest,
			grants: BTreeMap::new(),
		}
	}

	/// Build the cache for `role` in one pass over that role's rules.
	pub fn build(table: &PolicyTable, role: Role) -> Self {
		let mut grants: BTreeMap<Resource, BTreeSet<Action>> = BTreeMap::new();
		for rule in table.rules_for_role(role) {
			grants
				.entry(rule.resource())
				.or_default()
				.extend(rule.actions().iter().copied());
		}
		Self { role, grants }
	}

	/// Replace the whole cache with a fresh build for `role`.
	pub fn rebuild(&mut self, table: &PolicyTable, role: Role) {
		*self = Self::build(table, role);
	}

	pub fn role(&self) -> Role {
		self.role
	}

	pub fn has(&self, resource: Resource, action: Action) -> bool {
		self
			.grants
			.get(&resource)
			.is_some_and(|actions| actions.contains(&action))
	}

	/// The granted actions for `resource`, if any rule mentions it.
	pub fn actions(&self, resource: Resource) -> Option<&BTreeSet<Action>> {
		self.grants.get(&resource)
	}

	pub fn iter(&self) -> impl Iterator<Item = (Resource, &BTreeSet<Action>)> {
		self.grants.iter().map(|(resource, actions)| (*resource, actions))
	}

	pub fn is_empty(&self) -> bool {
		self.grants.is_empty()
	}
}
