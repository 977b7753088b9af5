// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The policy table: which role may do what to which resource.
//!
//! - [`PolicyTable`]: immutable rule list, indexed by role, shared behind `Arc`
//! - [`PermissionRule`]: one grant of actions, optionally narrowed by a [`Condition`]
//! - [`conditions`]: the named predicates the built-in table uses
//!
//! Rules are declared once at startup and never mutated. Custom tables are
//! supported through [`PolicyTable::new`] for tests and embedding.

pub mod conditions;
mod rules;
mod table;

pub use table::{Condition, ConditionFn, PermissionRule, PolicyTable};
