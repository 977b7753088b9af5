// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-based access control for the Campus learning platform.
//!
//! This crate provides:
//! - A static [`PolicyTable`] mapping `(role, resource)` to granted actions,
//!   optionally narrowed by a named [`Condition`] over instance attributes
//! - A per-role [`PermissionCache`] for constant-time coarse checks
//! - The [`evaluate`] procedure behind [`Access::can`] and [`Access::explain`]
//! - Subject resolution through the [`RoleResolver`] contract, with the
//!   `student` fallback on lookup failure
//! - [`SessionHolder`] for a single session and [`SessionRegistry`] for
//!   services tracking many subjects
//! - [`Gate`] and [`authorize!`] for boundary code
//!
//! # Usage
//!
//! ```ignore
//! use campus_authz::{Action, PolicyTable, Resource, SessionHolder, StaticRoleResolver};
//!
//! let resolver = StaticRoleResolver::new().with("u1", Role::Instructor);
//! let mut session = SessionHolder::new(PolicyTable::builtin(), Arc::new(resolver));
//! session.initialize(Some("u1".into())).await;
//!
//! let course = CourseAttrs::default().with_instructor("u1");
//! assert!(session.can(Action::Update, Resource::Course, Some(&course.into())));
//! ```

pub mod cache;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod resource;
pub mod session;
pub mod types;

pub use cache::PermissionCache;
pub use error::{AuthzError, Result};
pub use evaluator::{evaluate, Decision, DecisionReason};
pub use gate::{check, AccessDenied, Gate};
pub use policy::{Condition, ConditionFn, PermissionRule, PolicyTable};
pub use registry::SessionRegistry;
pub use resolver::{
	LookupError, RoleResolver, StaticRoleResolver, UnavailableRoleResolver,
};
pub use resource::{
	AssignmentAttrs, BlogAttrs, ContentStatus, CourseAttrs, CourseRef, EnrollmentAttrs,
	PaymentAttrs, ResourceData, ReviewAttrs, SubmissionRef, UserAttrs,
};
pub use session::{resolve_access, Access, SessionHolder};
pub use types::{Action, Resource, Role, Subject, SubjectId};
