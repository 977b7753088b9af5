// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authorization.
//!
//! - [`SubjectId`]: opaque identifier of an authenticated user
//! - [`Role`]: the privilege class a subject resolves to
//! - [`Resource`]: the kinds of objects the policy table protects
//! - [`Action`]: the operations a subject may attempt on a resource
//! - [`Subject`]: an optional identity paired with its resolved role
//!
//! The three enums are closed. Each serializes as its snake_case name, which
//! is also the string stored in the role table and accepted on the command
//! line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthzError;

// =============================================================================
// Subject IDs
// =============================================================================

/// Identifier of an authenticated subject, as issued by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
	/// Create a subject ID from any string-like value.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Borrow the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consume the ID and return the inner string.
	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Display for SubjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for SubjectId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for SubjectId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

// =============================================================================
// Subject
// =============================================================================

/// The party a decision is made for: an optional identity plus its role.
///
/// `id` is `None` only for anonymous visitors, who are always [`Role::Guest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
	pub id: Option<SubjectId>,
	pub role: Role,
}

impl Subject {
	/// An anonymous visitor.
	pub fn guest() -> Self {
		Self {
			id: None,
			role: Role::Guest,
		}
	}

	/// An identified subject with a resolved role.
	pub fn new(id: impl Into<SubjectId>, role: Role) -> Self {
		Self {
			id: Some(id.into()),
			role,
		}
	}

	/// Returns true if `other` names this subject.
	pub fn is(&self, other: &SubjectId) -> bool {
		self.id.as_ref() == Some(other)
	}
}

// =============================================================================
// Closed enumerations
// =============================================================================

macro_rules! define_str_enum {
	(
		$(#[$meta:meta])*
		$name:ident, $kind:literal {
			$($(#[$vmeta:meta])* $variant:ident => $str:literal),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
		)]
		#[serde(rename_all = "snake_case")]
		pub enum $name {
			$($(#[$vmeta])* $variant),+
		}

		impl $name {
			/// Returns every member, in declaration order.
			pub fn all() -> &'static [$name] {
				&[$($name::$variant),+]
			}

			/// Returns the snake_case name of this member.
			pub fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $str),+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = AuthzError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s.trim().to_ascii_lowercase().as_str() {
					$($str => Ok($name::$variant),)+
					_ => Err(AuthzError::UnknownVariant {
						kind: $kind,
						value: s.to_string(),
					}),
				}
			}
		}
	};
}

define_str_enum! {
	/// Privilege classes. Not a hierarchy: each role's grants are declared
	/// independently in the policy table, and only `SuperAdmin` bypasses it.
	Role, "role" {
		/// Unrestricted; never consults the policy table.
		SuperAdmin => "super_admin",
		/// Platform administration.
		Admin => "admin",
		/// Teaches courses and manages their content.
		Instructor => "instructor",
		/// Default for any authenticated subject without a usable role record.
		Student => "student",
		/// Unauthenticated visitor.
		Guest => "guest",
	}
}

define_str_enum! {
	/// Kinds of objects protected by the policy table.
	Resource, "resource" {
		Course => "course",
		Enrollment => "enrollment",
		Assignment => "assignment",
		Blog => "blog",
		User => "user",
		AdminPanel => "admin_panel",
		Analytics => "analytics",
		Settings => "settings",
		Payment => "payment",
		Review => "review",
	}
}

define_str_enum! {
	/// Operations a subject may attempt. `Manage` is granted explicitly and
	/// does not imply any other action.
	Action, "action" {
		Create => "create",
		Read => "read",
		Update => "update",
		Delete => "delete",
		Publish => "publish",
		Approve => "approve",
		Export => "export",
		Manage => "manage",
	}
}
