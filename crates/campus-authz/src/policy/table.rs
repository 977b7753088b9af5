// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission rules and the immutable table that holds them.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};
use tracing::warn;

use crate::error::{AuthzError, Result};
use crate::resource::ResourceData;
use crate::types::{Action, Resource, Role, Subject};

use super::rules;

/// Predicate signature. `None` means an attribute the predicate needs is
/// missing, which the evaluator treats the same as `Some(false)`. A predicate
/// that panics is treated as `None`.
pub type ConditionFn = fn(&Subject, &ResourceData) -> Option<bool>;

/// A named instance-level predicate.
///
/// Conditions are plain function pointers with a name so the table can be
/// printed and compared in tests.
#[derive(Clone, Copy)]
pub struct Condition {
	name: &'static str,
	check: ConditionFn,
}

impl Condition {
	pub const fn new(name: &'static str, check: ConditionFn) -> Self {
		Self { name, check }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Run the predicate. `None` if the payload lacks a required attribute
	/// or the predicate panicked.
	pub fn test(&self, subject: &Subject, data: &ResourceData) -> Option<bool> {
		match panic::catch_unwind(AssertUnwindSafe(|| (self.check)(subject, data))) {
			Ok(result) => result,
			Err(_) => {
				warn!(condition = self.name, "condition panicked, treating as unmet");
				None
			}
		}
	}
}

impl fmt::Debug for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Condition").field(&self.name).finish()
	}
}

impl PartialEq for Condition {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

/// A static grant of actions on a resource to a role, optionally narrowed by
/// a condition on the resource instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionRule {
	role: Role,
	resource: Resource,
	actions: BTreeSet<Action>,
	condition: Option<Condition>,
}

impl PermissionRule {
	pub fn new(role: Role, resource: Resource, actions: impl IntoIterator<Item = Action>) -> Self {
		Self {
			role,
			resource,
			actions: actions.into_iter().collect(),
			condition: None,
		}
	}

	/// Narrow this rule to instances that satisfy `condition`.
	pub fn when(mut self, condition: Condition) -> Self {
		self.condition = Some(condition);
		self
	}

	pub fn role(&self) -> Role {
		self.role
	}

	pub fn resource(&self) -> Resource {
		self.resource
	}

	pub fn actions(&self) -> &BTreeSet<Action> {
		&self.actions
	}

	pub fn condition(&self) -> Option<&Condition> {
		self.condition.as_ref()
	}

	pub fn grants(&self, action: Action) -> bool {
		self.actions.contains(&action)
	}
}

impl fmt::Display for PermissionRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let actions: Vec<&str> = self.actions.iter().map(Action::as_str).collect();
		write!(f, "{} {} [{}]", self.role, self.resource, actions.join(", "))?;
		if let Some(condition) = &self.condition {
			write!(f, " when {}", condition.name())?;
		}
		Ok(())
	}
}

static BUILTIN: LazyLock<Arc<PolicyTable>> =
	LazyLock::new(|| Arc::new(PolicyTable::index(rules::builtin_rules())));

/// The fixed, read-only list of permission rules, indexed by role.
#[derive(Debug, Clone)]
pub struct PolicyTable {
	rules: Vec<PermissionRule>,
	by_role: HashMap<Role, Vec<usize>>,
}

impl PolicyTable {
	/// Build a table from an explicit rule list.
	///
	/// # Errors
	/// Returns [`AuthzError::EmptyActionSet`] if any rule grants no actions.
	pub fn new(rules: Vec<PermissionRule>) -> Result<Self> {
		if let Some(rule) = rules.iter().find(|r| r.actions.is_empty()) {
			return Err(AuthzError::EmptyActionSet {
				role: rule.role,
				resource: rule.resource,
			});
		}
		Ok(Self::index(rules))
	}

	/// The process-wide table compiled into the binary.
	pub fn builtin() -> Arc<PolicyTable> {
		Arc::clone(&BUILTIN)
	}

	fn index(rules: Vec<PermissionRule>) -> Self {
		let mut by_role: HashMap<Role, Vec<usize>> = HashMap::new();
		for (idx, rule) in rules.iter().enumerate() {
			by_role.entry(rule.role).or_default().push(idx);
		}
		Self { rules, by_role }
	}

	pub fn rules(&self) -> &[PermissionRule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Every rule declared for `role`, in declaration order.
	pub fn rules_for_role(&self, role: Role) -> impl Iterator<Item = &PermissionRule> {
		self
			.by_role
			.get(&role)
			.into_iter()
			.flatten()
			.map(|&idx| &self.rules[idx])
	}

	/// Rules for `role` on `resource` whose action set contains `action`.
	pub fn rules_for(
		&self,
		role: Role,
		resource: Resource,
		action: Action,
	) -> impl Iterator<Item = &PermissionRule> {
		self
			.rules_for_role(role)
			.filter(move |r| r.resource == resource && r.grants(action))
	}

	/// Conditions attached to the rules returned by [`PolicyTable::rules_for`].
	pub fn conditions_for(
		&self,
		role: Role,
		resource: Resource,
		action: Action,
	) -> impl Iterator<Item = &Condition> {
		self
			.rules_for(role, resource, action)
			.filter_map(PermissionRule::condition)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn always(_: &Subject, _: &ResourceData) -> Option<bool> {
		Some(true)
	}

	fn explodes(_: &Subject, _: &ResourceData) -> Option<bool> {
		panic!("malformed predicate")
	}

	#[test]
	fn panicking_condition_reads_as_missing() {
		let condition = Condition::new("explodes", explodes);
		let data = ResourceData::from(crate::resource::CourseAttrs::default());
		assert_eq!(condition.test(&Subject::guest(), &data), None);
	}

	#[test]
	fn new_rejects_empty_action_sets() {
		let err = PolicyTable::new(vec![
			PermissionRule::new(Role::Student, Resource::Course, [Action::Read]),
			PermissionRule::new(Role::Student, Resource::Blog, Vec::<Action>::new()),
		])
		.unwrap_err();
		assert!(matches!(
			err,
			AuthzError::EmptyActionSet {
				role: Role::Student,
				resource: Resource::Blog,
			}
		));
	}

	#[test]
	fn builtin_rules_all_grant_something() {
		let table = PolicyTable::builtin();
		assert!(!table.is_empty());
		assert!(table.rules().iter().all(|r| !r.actions().is_empty()));
	}

	#[test]
	fn builtin_grants_nothing_to_super_admin() {
		let table = PolicyTable::builtin();
		assert_eq!(table.rules_for_role(Role::SuperAdmin).count(), 0);
	}

	#[test]
	fn rules_for_filters_by_role_resource_and_action() {
		let table = PolicyTable::new(vec![
			PermissionRule::new(Role::Instructor, Resource::Course, [Action::Read]),
			PermissionRule::new(Role::Instructor, Resource::Course, [Action::Update])
				.when(Condition::new("always", always)),
			PermissionRule::new(Role::Instructor, Resource::Blog, [Action::Update]),
			PermissionRule::new(Role::Student, Resource::Course, [Action::Update]),
		])
		.unwrap();

		let matched: Vec<_> = table
			.rules_for(Role::Instructor, Resource::Course, Action::Update)
			.collect();
		assert_eq!(matched.len(), 1);
		assert_eq!(matched[0].condition().map(Condition::name), Some("always"));

		assert_eq!(table.rules_for_role(Role::Instructor).count(), 3);
		assert_eq!(
			table
				.conditions_for(Role::Instructor, Resource::Course, Action::Read)
				.count(),
			0
		);
	}

	#[test]
	fn rule_display_lists_actions_and_condition() {
		let rule = PermissionRule::new(
			Role::Admin,
			Resource::User,
			[Action::Delete, Action::Update],
		)
		.when(Condition::new("always", always));
		assert_eq!(rule.to_string(), "admin user [update, delete] when always");
	}
}
