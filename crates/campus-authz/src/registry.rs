// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared, keyed session state for long-running services.
//!
//! A [`SessionRegistry`] holds one [`Access`] snapshot per authenticated
//! subject. Guests are never stored; they all share a single snapshot.
//! Readers clone the `Arc` out of the map and query it without holding any
//! shard lock, so a concurrent re-initialization never blocks a decision.
//!
//! The registry has no size or age bound. Entries live until the caller
//! drops them with [`SessionRegistry::invalidate`] (for example on logout or
//! a role change) or sweeps them with [`SessionRegistry::retain`].

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::policy::PolicyTable;
use crate::resolver::RoleResolver;
use crate::session::{resolve_access, Access};
use crate::types::{Subject, SubjectId};

pub struct SessionRegistry {
	table: Arc<PolicyTable>,
	resolver: Arc<dyn RoleResolver>,
	timeout: Option<Duration>,
	guest: Arc<Access>,
	sessions: DashMap<SubjectId, Arc<Access>>,
}

impl SessionRegistry {
	pub fn new(table: Arc<PolicyTable>, resolver: Arc<dyn RoleResolver>) -> Self {
		let guest = Arc::new(Access::for_subject(Arc::clone(&table), Subject::guest()));
		Self {
			table,
			resolver,
			timeout: None,
			guest,
			sessions: DashMap::new(),
		}
	}

	/// Builder: bound resolver lookups by `timeout`.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Resolve `subject_id` and store the result, replacing any earlier entry.
	#[instrument(
		level = "debug",
		skip(self, subject_id),
		fields(subject_id = subject_id.as_ref().map(SubjectId::as_str))
	)]
	pub async fn initialize(&self, subject_id: Option<SubjectId>) -> Arc<Access> {
		let Some(id) = subject_id else {
			return Arc::clone(&self.guest);
		};

		let access = Arc::new(
			resolve_access(
				&self.table,
				self.resolver.as_ref(),
				Some(id.clone()),
				self.timeout,
			)
			.await,
		);
		self.sessions.insert(id, Arc::clone(&access));
		debug!(sessions = self.sessions.len(), "session stored");
		access
	}

	/// The stored snapshot for `subject_id`, without resolving.
	pub fn get(&self, subject_id: &SubjectId) -> Option<Arc<Access>> {
		self
			.sessions
			.get(subject_id)
			.map(|entry| Arc::clone(entry.value()))
	}

	/// The stored snapshot, resolving on first use.
	pub async fn get_or_initialize(&self, subject_id: Option<SubjectId>) -> Arc<Access> {
		match subject_id {
			None => Arc::clone(&self.guest),
			Some(id) => match self.get(&id) {
				Some(access) => access,
				None => self.initialize(Some(id)).await,
			},
		}
	}

	/// The snapshot every unauthenticated caller shares.
	pub fn guest(&self) -> Arc<Access> {
		Arc::clone(&self.guest)
	}

	/// Drop the stored snapshot so the next lookup re-resolves. Returns
	/// whether an entry existed.
	pub fn invalidate(&self, subject_id: &SubjectId) -> bool {
		self.sessions.remove(subject_id).is_some()
	}

	/// Keep only the entries for which `keep` returns true. Returns how many
	/// were evicted.
	pub fn retain(&self, mut keep: impl FnMut(&SubjectId, &Access) -> bool) -> usize {
		let before = self.sessions.len();
		self.sessions.retain(|id, access| keep(id, &**access));
		let evicted = before.saturating_sub(self.sessions.len());
		debug!(evicted, sessions = self.sessions.len(), "sessions swept");
		evicted
	}

	pub fn len(&self) -> usize {
		self.sessions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sessions.is_empty()
	}
}
