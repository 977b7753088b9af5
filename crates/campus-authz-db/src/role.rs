// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use campus_authz::{LookupError, Role, RoleResolver, SubjectId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{DbError, Result};

/// One row of `user_roles` with a validated role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
	pub user_id: SubjectId,
	pub role: Role,
	pub assigned_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

type RoleRow = (String, String, DateTime<Utc>, DateTime<Utc>);

fn parse_row((user_id, role, assigned_at, updated_at): RoleRow) -> Result<RoleAssignment> {
	let user_id = SubjectId::new(user_id);
	let role = role.parse::<Role>().map_err(|_| DbError::InvalidRole {
		user_id: user_id.clone(),
		value: role,
	})?;
	Ok(RoleAssignment {
		user_id,
		role,
		assigned_at,
		updated_at,
	})
}

#[derive(Clone)]
pub struct RoleRepository {
	pool: SqlitePool,
}

impl RoleRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_role(&self, user_id: &SubjectId) -> Result<Option<RoleAssignment>> {
		let row = sqlx::query_as::<_, RoleRow>(
			"SELECT user_id, role, assigned_at, updated_at FROM user_roles WHERE user_id = ?",
		)
		.bind(user_id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		row.map(parse_row).transpose()
	}

	/// Insert or replace the role for `user_id`. `assigned_at` is kept on
	/// update.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role = %role))]
	pub async fn assign_role(&self, user_id: &SubjectId, role: Role) -> Result<()> {
		let now = Utc::now();
		sqlx::query(
			r#"
			INSERT INTO user_roles (user_id, role, assigned_at, updated_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(user_id) DO UPDATE SET
				role = excluded.role,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(user_id.as_str())
		.bind(role.as_str())
		.bind(now)
		.bind(now)
		.execute(&self.pool)
		.await?;

		tracing::info!("role assigned");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn revoke_role(&self, user_id: &SubjectId) -> Result<()> {
		let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
			.bind(user_id.as_str())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(user_id.to_string()));
		}

		tracing::info!("role revoked");
		Ok(())
	}

	/// All assignments ordered by user ID. Rows holding an unknown role fail
	/// the whole listing.
	#[tracing::instrument(skip(self))]
	pub async fn list_roles(&self) -> Result<Vec<RoleAssignment>> {
		let rows = sqlx::query_as::<_, RoleRow>(
			"SELECT user_id, role, assigned_at, updated_at FROM user_roles ORDER BY user_id",
		)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(parse_row).collect()
	}
}

#[async_trait]
pub trait RoleStore: Send + Sync {
	async fn get_role(&self, user_id: &SubjectId) -> Result<Option<RoleAssignment>>;
	async fn assign_role(&self, user_id: &SubjectId, role: Role) -> Result<()>;
	async fn revoke_role(&self, user_id: &SubjectId) -> Result<()>;
	async fn list_roles(&self) -> Result<Vec<RoleAssignment>>;
}

#[async_trait]
impl RoleStore for RoleRepository {
	async fn get_role(&self, user_id: &SubjectId) -> Result<Option<RoleAssignment>> {
		self.get_role(user_id).await
	}

	async fn assign_role(&self, user_id: &SubjectId, role: Role) -> Result<()> {
		self.assign_role(user_id, role).await
	}

	async fn revoke_role(&self, user_id: &SubjectId) -> Result<()> {
		self.revoke_role(user_id).await
	}

	async fn list_roles(&self) -> Result<Vec<RoleAssignment>> {
		self.list_roles().await
	}
}

#[async_trait]
impl RoleResolver for RoleRepository {
	async fn resolve_role(&self, subject: &SubjectId) -> std::result::Result<Role, LookupError> {
		match self.get_role(subject).await {
			Ok(Some(assignment)) => Ok(assignment.role),
			Ok(None) => Err(LookupError::NotFound(subject.clone())),
			Err(DbError::InvalidRole { user_id, value }) => Err(LookupError::InvalidRole {
				subject: user_id,
				value,
			}),
			Err(e) => Err(LookupError::Unavailable(e.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_role_test_pool, insert_raw_role};
	use campus_authz::{Action, PolicyTable, Resource, SessionHolder};
	use std::sync::Arc;

	async fn repo() -> RoleRepository {
		RoleRepository::new(create_role_test_pool().await.unwrap())
	}

	mod store {
		use super::*;

		#[tokio::test]
		async fn assign_then_get() {
			let repo = repo().await;
			let user = SubjectId::new("u1");
			repo.assign_role(&user, Role::Instructor).await.unwrap();

			let assignment = repo.get_role(&user).await.unwrap().unwrap();
			assert_eq!(assignment.user_id, user);
			assert_eq!(assignment.role, Role::Instructor);
		}

		#[tokio::test]
		async fn reassign_replaces_role_and_keeps_assigned_at() {
			let repo = repo().await;
			let user = SubjectId::new("u1");
			repo.assign_role(&user, Role::Student).await.unwrap();
			let first = repo.get_role(&user).await.unwrap().unwrap();

			repo.assign_role(&user, Role::Admin).await.unwrap();
			let second = repo.get_role(&user).await.unwrap().unwrap();

			assert_eq!(second.role, Role::Admin);
			assert_eq!(second.assigned_at, first.assigned_at);
			assert!(second.updated_at >= first.updated_at);
		}

		#[tokio::test]
		async fn get_missing_is_none() {
			let repo = repo().await;
			assert!(repo.get_role(&SubjectId::new("nobody")).await.unwrap().is_none());
		}

		#[tokio::test]
		async fn revoke_removes_row() {
			let repo = repo().await;
			let user = SubjectId::new("u1");
			repo.assign_role(&user, Role::Admin).await.unwrap();
			repo.revoke_role(&user).await.unwrap();
			assert!(repo.get_role(&user).await.unwrap().is_none());

			let err = repo.revoke_role(&user).await.unwrap_err();
			assert!(matches!(err, DbError::NotFound(_)));
		}

		#[tokio::test]
		async fn list_is_ordered_by_user() {
			let repo = repo().await;
			repo
				.assign_role(&SubjectId::new("b"), Role::Student)
				.await
				.unwrap();
			repo
				.assign_role(&SubjectId::new("a"), Role::Admin)
				.await
				.unwrap();

			let all = repo.list_roles().await.unwrap();
			let ids: Vec<_> = all.iter().map(|a| a.user_id.as_str()).collect();
			assert_eq!(ids, ["a", "b"]);
		}

		#[tokio::test]
		async fn unknown_role_string_is_rejected() {
			let pool = create_role_test_pool().await.unwrap();
			insert_raw_role(&pool, "u9", "moderator").await.unwrap();
			let repo = RoleRepository::new(pool);

			let err = repo.get_role(&SubjectId::new("u9")).await.unwrap_err();
			assert!(matches!(err, DbError::InvalidRole { ref value, .. } if value == "moderator"));
		}

		#[tokio::test]
		async fn stored_role_strings_are_case_insensitive() {
			let pool = create_role_test_pool().await.unwrap();
			insert_raw_role(&pool, "u1", "Super_Admin").await.unwrap();
			let repo = RoleRepository::new(pool);

			let assignment = repo.get_role(&SubjectId::new("u1")).await.unwrap().unwrap();
			assert_eq!(assignment.role, Role::SuperAdmin);
		}
	}

	mod resolver {
		use super::*;

		#[tokio::test]
		async fn resolves_stored_role() {
			let repo = repo().await;
			repo
				.assign_role(&SubjectId::new("u1"), Role::Instructor)
				.await
				.unwrap();
			let role = repo.resolve_role(&SubjectId::new("u1")).await.unwrap();
			assert_eq!(role, Role::Instructor);
		}

		#[tokio::test]
		async fn missing_row_is_not_found() {
			let repo = repo().await;
			let err = repo.resolve_role(&SubjectId::new("u1")).await.unwrap_err();
			assert!(matches!(err, LookupError::NotFound(_)));
		}

		#[tokio::test]
		async fn invalid_row_maps_to_invalid_role() {
			let pool = create_role_test_pool().await.unwrap();
			insert_raw_role(&pool, "u9", "owner").await.unwrap();
			let repo = RoleRepository::new(pool);

			let err = repo.resolve_role(&SubjectId::new("u9")).await.unwrap_err();
			assert!(matches!(err, LookupError::InvalidRole { .. }));
		}

		#[tokio::test]
		async fn broken_store_falls_back_to_student_in_session() {
			let pool = SqlitePool::connect(":memory:").await.unwrap();
			let repo = RoleRepository::new(pool);
			let mut session = SessionHolder::new(PolicyTable::builtin(), Arc::new(repo));

			session.initialize(Some(SubjectId::new("u3"))).await;
			assert_eq!(session.role(), Role::Student);
			assert!(session.cannot(Action::Manage, Resource::AdminPanel, None));
		}

		#[tokio::test]
		async fn role_change_seen_on_reinitialize() {
			let repo = repo().await;
			let user = SubjectId::new("u1");
			repo.assign_role(&user, Role::Student).await.unwrap();

			let mut session = SessionHolder::new(PolicyTable::builtin(), Arc::new(repo.clone()));
			session.initialize(Some(user.clone())).await;
			assert!(session.cannot(Action::Read, Resource::Analytics, None));

			repo.assign_role(&user, Role::Admin).await.unwrap();
			assert!(session.cannot(Action::Read, Resource::Analytics, None));

			session.initialize(Some(user)).await;
			assert!(session.can(Action::Read, Resource::Analytics, None));
		}
	}
}
