// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite-backed role store for campus-authz.
//!
//! - [`RoleRepository`]: reads and edits the `user_roles` table and
//!   implements [`campus_authz::RoleResolver`]
//! - [`create_pool`]: WAL-mode connection pool
//! - [`run_migrations`]: idempotent schema setup
//! - [`testing`]: in-memory fixtures

pub mod error;
pub mod migrations;
pub mod pool;
pub mod role;
pub mod testing;

pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use role::{RoleAssignment, RoleRepository, RoleStore};
