// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The role lookup contract consumed by session initialization.
//!
//! The engine does not own role storage. Anything that can map a subject ID
//! to a [`Role`] implements [`RoleResolver`]; `campus-authz-db` provides the
//! SQLite-backed implementation and [`StaticRoleResolver`] covers tests and
//! fixed deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::types::{Role, SubjectId};

/// Reasons a role lookup can fail. Every variant leads to the `student`
/// fallback during initialization.
#[derive(Debug, Error)]
pub enum LookupError {
	#[error("no role record for subject {0}")]
	NotFound(SubjectId),

	#[error("role store unavailable: {0}")]
	Unavailable(String),

	#[error("role record for subject {subject} holds unknown role '{value}'")]
	InvalidRole { subject: SubjectId, value: String },

	#[error("role lookup timed out")]
	Timeout,
}

/// Maps an authenticated subject to its role. May perform I/O.
#[async_trait]
pub trait RoleResolver: Send + Sync {
	async fn resolve_role(&self, subject: &SubjectId) -> Result<Role, LookupError>;
}

#[async_trait]
impl<R: RoleResolver + ?Sized> RoleResolver for Arc<R> {
	async fn resolve_role(&self, subject: &SubjectId) -> Result<Role, LookupError> {
		(**self).resolve_role(subject).await
	}
}

/// Fixed in-memory role assignments.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleResolver {
	roles: HashMap<SubjectId, Role>,
}

impl StaticRoleResolver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: assign `role` to `subject`.
	pub fn with(mut self, subject: impl Into<SubjectId>, role: Role) -> Self {
		self.roles.insert(subject.into(), role);
		self
	}

	pub fn assign(&mut self, subject: impl Into<SubjectId>, role: Role) {
		self.roles.insert(subject.into(), role);
	}
}

impl FromIterator<(SubjectId, Role)> for StaticRoleResolver {
	fn from_iter<T: IntoIterator<Item = (SubjectId, Role)>>(iter: T) -> Self {
		Self {
			roles: iter.into_iter().collect(),
		}
	}
}

#[async_trait]
impl RoleResolver for StaticRoleResolver {
	async fn resolve_role(&self, subject: &SubjectId) -> Result<Role, LookupError> {
		self
			.roles
			.get(subject)
			.copied()
			.ok_or_else(|| LookupError::NotFound(subject.clone()))
	}
}

/// Stands in for a role store that could not be reached. Every lookup fails
/// with [`LookupError::Unavailable`], so initialization commits `student`.
#[derive(Debug, Clone)]
pub struct UnavailableRoleResolver {
	reason: String,
}

impl UnavailableRoleResolver {
	pub fn new(reason: impl Into<String>) -> Self {
		Self {
			reason: reason.into(),
		}
	}
}

#[async_trait]
impl RoleResolver for UnavailableRoleResolver {
	async fn resolve_role(&self, _subject: &SubjectId) -> Result<Role, LookupError> {
		Err(LookupError::Unavailable(self.reason.clone()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn static_resolver_returns_assigned_role() {
		let resolver = StaticRoleResolver::new().with("u1", Role::Instructor);
		let role = resolver.resolve_role(&SubjectId::new("u1")).await.unwrap();
		assert_eq!(role, Role::Instructor);
	}

	#[tokio::test]
	async fn static_resolver_reports_missing_subject() {
		let resolver = StaticRoleResolver::new();
		let err = resolver
			.resolve_role(&SubjectId::new("nobody"))
			.await
			.unwrap_err();
		assert!(matches!(err, LookupError::NotFound(id) if id.as_str() == "nobody"));
	}

	#[tokio::test]
	async fn arc_dyn_resolver_delegates() {
		let resolver: Arc<dyn RoleResolver> =
			Arc::new(StaticRoleResolver::new().with("u1", Role::Admin));
		let role = resolver.resolve_role(&SubjectId::new("u1")).await.unwrap();
		assert_eq!(role, Role::Admin);
	}

	#[tokio::test]
	async fn unavailable_resolver_always_fails() {
		let resolver = UnavailableRoleResolver::new("disk gone");
		let err = resolver.resolve_role(&SubjectId::new("u1")).await.unwrap_err();
		assert!(matches!(err, LookupError::Unavailable(reason) if reason == "disk gone"));
	}

	#[test]
	fn collects_from_pairs() {
		let resolver: StaticRoleResolver = [(SubjectId::new("a"), Role::Student)]
			.into_iter()
			.collect();
		assert_eq!(resolver.roles.len(), 1);
	}
}
