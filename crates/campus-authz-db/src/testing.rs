// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory fixtures for tests in this and dependent crates.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use crate::error::Result;
use crate::migrations::run_migrations;

/// An in-memory pool with the role schema applied.
pub async fn create_role_test_pool() -> Result<SqlitePool> {
	let pool = SqlitePool::connect(":memory:").await?;
	run_migrations(&pool).await?;
	Ok(pool)
}

/// Insert a raw row, bypassing role validation.
pub async fn insert_raw_role(pool: &SqlitePool, user_id: &str, role: &str) -> Result<()> {
	let now = Utc::now();
	sqlx::query(
		r#"
		INSERT INTO user_roles (user_id, role, assigned_at, updated_at)
		VALUES (?, ?, ?, ?)
		"#,
	)
	.bind(user_id)
	.bind(role)
	.bind(now)
	.bind(now)
	.execute(pool)
	.await?;
	Ok(())
}
