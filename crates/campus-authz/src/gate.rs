// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative gates for boundary code.
//!
//! A [`Gate`] bundles an optional role requirement and an optional
//! permission requirement. Boundary code (route handlers, RPC interceptors,
//! renderers) asks the gate whether an [`Access`] snapshot passes and only
//! then executes the protected work.
//!
//! - [`Gate::allows`]: plain boolean
//! - [`Gate::run`]: pick between a protected and a fallback closure
//! - [`Gate::guard`] / [`check`] / [`authorize!`]: `Result` for `?`
//!
//! # Example
//!
//! ```ignore
//! let gate = Gate::new()
//!     .require_any_role([Role::Instructor, Role::Admin])
//!     .require_permission(Action::Update, Resource::Course)
//!     .with_data(CourseAttrs::default().with_instructor(course.instructor_id));
//! gate.guard(&access)?;
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::evaluator::DecisionReason;
use crate::resource::ResourceData;
use crate::session::Access;
use crate::types::{Action, Resource, Role};

/// A denied gate. The message is deliberately generic.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Permission denied")]
pub struct AccessDenied {
	pub role: Role,
	/// `None` when the role requirement failed before any permission check.
	pub reason: Option<DecisionReason>,
}

/// A role and/or permission requirement. An empty gate admits everyone.
#[derive(Debug, Clone, Default)]
pub struct Gate {
	roles: Vec<Role>,
	permission: Option<(Action, Resource)>,
	data: Option<ResourceData>,
}

impl Gate {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn require_role(mut self, role: Role) -> Self {
		self.roles.push(role);
		self
	}

	/// Pass if the subject holds any one of `roles`.
	pub fn require_any_role(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
		self.roles.extend(roles);
		self
	}

	pub fn require_permission(mut self, action: Action, resource: Resource) -> Self {
		self.permission = Some((action, resource));
		self
	}

	/// Instance attributes for the permission check.
	pub fn with_data(mut self, data: impl Into<ResourceData>) -> Self {
		self.data = Some(data.into());
		self
	}

	pub fn roles(&self) -> &[Role] {
		&self.roles
	}

	pub fn permission(&self) -> Option<(Action, Resource)> {
		self.permission
	}

	pub fn allows(&self, access: &Access) -> bool {
		self.guard(access).is_ok()
	}

	/// Run `protected` if the gate passes, `fallback` otherwise. `protected`
	/// is never invoked on a failing check.
	pub fn run<T>(
		&self,
		access: &Access,
		protected: impl FnOnce() -> T,
		fallback: impl FnOnce() -> T,
	) -> T {
		if self.allows(access) {
			protected()
		} else {
			fallback()
		}
	}

	#[instrument(
		level = "debug",
		skip(self, access),
		fields(role = %access.role(), permission = ?self.permission)
	)]
	pub fn guard(&self, access: &Access) -> Result<(), AccessDenied> {
		if !self.roles.is_empty() && !access.has_any_role(&self.roles) {
			debug!(required = ?self.roles, "gate denied: role requirement");
			return Err(AccessDenied {
				role: access.role(),
				reason: None,
			});
		}

		match self.permission {
			Some((action, resource)) => check(access, action, resource, self.data.as_ref()),
			None => Ok(()),
		}
	}
}

/// Check one permission, mapping a denial to [`AccessDenied`].
pub fn check(
	access: &Access,
	action: Action,
	resource: Resource,
	data: Option<&ResourceData>,
) -> Result<(), AccessDenied> {
	let decision = access.explain(action, resource, data);
	if decision.allowed {
		Ok(())
	} else {
		debug!(%action, %resource, reason = ?decision.reason, "gate denied: permission");
		Err(AccessDenied {
			role: access.role(),
			reason: Some(decision.reason),
		})
	}
}

/// Inline permission check for handlers.
///
/// ```ignore
/// authorize!(&access, Action::Delete, Resource::Blog, &blog_data)?;
/// authorize!(&access, Action::Read, Resource::Analytics)?;
/// ```
#[macro_export]
macro_rules! authorize {
	($access:expr, $action:expr, $resource:expr) => {
		$crate::gate::check($access, $action, $resource, None)
	};
	($access:expr, $action:expr, $resource:expr, $data:expr) => {
		$crate::gate::check($access, $action, $resource, Some($data))
	};
}
