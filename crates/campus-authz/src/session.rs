// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolved per-subject authorization state.
//!
//! - [`Access`]: an immutable snapshot (subject + role cache) answering every
//!   authorization query without blocking
//! - [`SessionHolder`]: owns the current snapshot for one session or request
//!   and replaces it on [`SessionHolder::initialize`]
//! - [`resolve_access`]: the resolution step shared with
//!   [`crate::SessionRegistry`]
//!
//! # Resolution rules
//!
//! - no subject ID: `guest`, resolver not called
//! - resolver returns a role: that role
//! - resolver fails, finds nothing, or times out: `student`, keeping the ID
//!
//! A snapshot is built completely before it is swapped in, so callers never
//! observe a half-built cache. Dropping an in-flight `initialize` leaves the
//! previous snapshot in place. Role changes in the store are not pushed;
//! they show up on the next `initialize`.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::cache::PermissionCache;
use crate::evaluator::{evaluate, Decision};
use crate::policy::PolicyTable;
use crate::resolver::{LookupError, RoleResolver};
use crate::resource::ResourceData;
use crate::types::{Action, Resource, Role, Subject, SubjectId};

/// One subject's resolved role and permission cache.
#[derive(Debug, Clone)]
pub struct Access {
	table: Arc<PolicyTable>,
	subject: Subject,
	cache: PermissionCache,
}

impl Access {
	/// State before any initialization: guest with an empty cache.
	pub fn unresolved(table: Arc<PolicyTable>) -> Self {
		Self {
			table,
			subject: Subject::guest(),
			cache: PermissionCache::empty(),
		}
	}

	/// Snapshot for an already-resolved subject.
	pub fn for_subject(table: Arc<PolicyTable>, subject: Subject) -> Self {
		let cache = PermissionCache::build(&table, subject.role);
		Self {
			table,
			subject,
			cache,
		}
	}

	pub fn table(&self) -> &Arc<PolicyTable> {
		&self.table
	}

	pub fn subject(&self) -> &Subject {
		&self.subject
	}

	pub fn subject_id(&self) -> Option<&SubjectId> {
		self.subject.id.as_ref()
	}

	pub fn role(&self) -> Role {
		self.subject.role
	}

	pub fn cache(&self) -> &PermissionCache {
		&self.cache
	}

	/// Decide and report why.
	pub fn explain(
		&self,
		action: Action,
		resource: Resource,
		data: Option<&ResourceData>,
	) -> Decision {
		evaluate(
			&self.table,
			&self.cache,
			&self.subject,
			action,
			resource,
			data,
		)
	}

	pub fn can(&self, action: Action, resource: Resource, data: Option<&ResourceData>) -> bool {
		self.explain(action, resource, data).allowed
	}

	pub fn cannot(&self, action: Action, resource: Resource, data: Option<&ResourceData>) -> bool {
		!self.can(action, resource, data)
	}

	pub fn has_role(&self, role: Role) -> bool {
		self.subject.role == role
	}

	pub fn has_any_role(&self, roles: &[Role]) -> bool {
		roles.contains(&self.subject.role)
	}

	/// True iff there is a subject ID and the role is not `guest`.
	pub fn is_authenticated(&self) -> bool {
		self.subject.id.is_some() && self.subject.role != Role::Guest
	}

	pub fn is_admin(&self) -> bool {
		self.has_any_role(&[Role::Admin, Role::SuperAdmin])
	}

	pub fn is_instructor(&self) -> bool {
		self.has_role(Role::Instructor)
	}
}

/// Resolve `subject_id` to a fresh snapshot, applying the fallback rules.
///
/// Never fails. With `timeout` set, a lookup that takes longer commits the
/// `student` fallback.
#[instrument(
	level = "debug",
	skip(table, resolver, subject_id),
	fields(subject_id = subject_id.as_ref().map(SubjectId::as_str))
)]
pub async fn resolve_access(
	table: &Arc<PolicyTable>,
	resolver: &dyn RoleResolver,
	subject_id: Option<SubjectId>,
	timeout: Option<Duration>,
) -> Access {
	let Some(id) = subject_id else {
		debug!("no subject, resolving as guest");
		return Access::for_subject(Arc::clone(table), Subject::guest());
	};

	let lookup = resolver.resolve_role(&id);
	let result = match timeout {
		Some(limit) => tokio::time::timeout(limit, lookup)
			.await
			.unwrap_or(Err(LookupError::Timeout)),
		None => lookup.await,
	};

	let role = match result {
		Ok(role) => role,
		Err(error) => {
			warn!(subject_id = %id, %error, "role lookup failed, falling back to student");
			Role::Student
		}
	};

	debug!(subject_id = %id, role = %role, "subject resolved");
	Access::for_subject(Arc::clone(table), Subject { id: Some(id), role })
}

/// The authorization state of a single session or request.
pub struct SessionHolder {
	resolver: Arc<dyn RoleResolver>,
	timeout: Option<Duration>,
	current: Arc<Access>,
}

impl SessionHolder {
	/// A holder in the unresolved guest state with an empty cache.
	pub fn new(table: Arc<PolicyTable>, resolver: Arc<dyn RoleResolver>) -> Self {
		Self {
			resolver,
			timeout: None,
			current: Arc::new(Access::unresolved(table)),
		}
	}

	/// Builder: bound resolver lookups by `timeout`.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Resolve the subject and swap in a new snapshot.
	///
	/// May be called again at any time, for example after a role change.
	pub async fn initialize(&mut self, subject_id: Option<SubjectId>) -> Arc<Access> {
		self.resolve_and_swap(subject_id, self.timeout).await
	}

	/// [`Self::initialize`] with a one-off lookup bound. A lookup that
	/// outlives `timeout` commits the `student` fallback.
	pub async fn initialize_with_timeout(
		&mut self,
		subject_id: Option<SubjectId>,
		timeout: Duration,
	) -> Arc<Access> {
		self.resolve_and_swap(subject_id, Some(timeout)).await
	}

	// The snapshot is replaced only once resolution completes, so a dropped
	// future leaves the previous state in place.
	async fn resolve_and_swap(
		&mut self,
		subject_id: Option<SubjectId>,
		timeout: Option<Duration>,
	) -> Arc<Access> {
		let next = resolve_access(
			self.current.table(),
			self.resolver.as_ref(),
			subject_id,
			timeout,
		)
		.await;
		self.current = Arc::new(next);
		Arc::clone(&self.current)
	}

	/// The current snapshot, cheap to clone into request extensions.
	pub fn access(&self) -> Arc<Access> {
		Arc::clone(&self.current)
	}

	pub fn explain(
		&self,
		action: Action,
		resource: Resource,
		data: Option<&ResourceData>,
	) -> Decision {
		self.current.explain(action, resource, data)
	}

	pub fn can(&self, action: Action, resource: Resource, data: Option<&ResourceData>) -> bool {
		self.current.can(action, resource, data)
	}

	pub fn cannot(&self, action: Action, resource: Resource, data: Option<&ResourceData>) -> bool {
		self.current.cannot(action, resource, data)
	}

	pub fn role(&self) -> Role {
		self.current.role()
	}

	pub fn subject_id(&self) -> Option<&SubjectId> {
		self.current.subject_id()
	}

	pub fn has_role(&self, role: Role) -> bool {
		self.current.has_role(role)
	}

	pub fn has_any_role(&self, roles: &[Role]) -> bool {
		self.current.has_any_role(roles)
	}

	pub fn is_authenticated(&self) -> bool {
		self.current.is_authenticated()
	}

	pub fn is_admin(&self) -> bool {
		self.current.is_admin()
	}

	pub fn is_instructor(&self) -> bool {
		self.current.is_instructor()
	}

	pub fn cache(&self) -> &PermissionCache {
		self.current.cache()
	}
}
