// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations. Rendering is kept separate from I/O so the
//! output format can be tested without a database.

use anyhow::Context;
use campus_authz::{
	Action, Decision, DecisionReason, PermissionCache, PolicyTable, Resource, ResourceData, Role,
	RoleResolver, SessionHolder, StaticRoleResolver, SubjectId, UnavailableRoleResolver,
};
use campus_authz_config::AuthzConfig;
use campus_authz_db::{create_pool, run_migrations, RoleRepository};
use std::fmt::Write;
use std::sync::Arc;

pub struct CheckArgs {
	pub subject: Option<String>,
	pub role: Option<Role>,
	pub action: Action,
	pub resource: Resource,
	pub data: Option<String>,
	pub json: bool,
}

async fn open_store(config: &AuthzConfig) -> anyhow::Result<RoleRepository> {
	let pool = create_pool(&config.database.url)
		.await
		.with_context(|| format!("opening role store at {}", config.database.url))?;
	run_migrations(&pool).await.context("migrating role store")?;
	Ok(RoleRepository::new(pool))
}

pub fn parse_data(resource: Resource, raw: Option<&str>) -> anyhow::Result<Option<ResourceData>> {
	let Some(raw) = raw else {
		return Ok(None);
	};
	let value: serde_json::Value =
		serde_json::from_str(raw).context("--data is not valid JSON")?;
	Ok(Some(ResourceData::from_json(resource, value)?))
}

pub async fn check(config: &AuthzConfig, args: CheckArgs) -> anyhow::Result<String> {
	let data = parse_data(args.resource, args.data.as_deref())?;
	let subject = args.subject.map(SubjectId::new);

	// Anonymous checks resolve to guest without consulting any store.
	let resolver: Arc<dyn RoleResolver> = match (&subject, args.role) {
		(None, Some(_)) => anyhow::bail!("--role requires --subject"),
		(None, None) => Arc::new(StaticRoleResolver::new()),
		(Some(id), Some(role)) => Arc::new(StaticRoleResolver::new().with(id.clone(), role)),
		(Some(_), None) => match open_store(config).await {
			Ok(store) => Arc::new(store),
			Err(error) => {
				let reason = format!("{error:#}");
				tracing::warn!(error = %reason, "role store unavailable, resolving as student");
				Arc::new(UnavailableRoleResolver::new(reason))
			}
		},
	};

	let mut session = SessionHolder::new(PolicyTable::builtin(), resolver)
		.with_timeout(config.resolver.timeout());
	session.initialize(subject).await;

	let decision = session.explain(args.action, args.resource, data.as_ref());
	tracing::debug!(allowed = decision.allowed, "check complete");

	if args.json {
		Ok(serde_json::to_string_pretty(&serde_json::json!({
			"subject": session.subject_id(),
			"role": session.role(),
			"action": args.action,
			"resource": args.resource,
			"decision": decision,
		}))?)
	} else {
		Ok(render_decision(
			session.role(),
			args.action,
			args.resource,
			&decision,
		))
	}
}

pub fn render_decision(role: Role, action: Action, resource: Resource, decision: &Decision) -> String {
	let verdict = if decision.allowed { "allowed" } else { "denied" };
	let why = match decision.reason {
		DecisionReason::SuperAdminBypass => "super_admin bypasses all rules".to_string(),
		DecisionReason::NotGranted => format!("no {role} rule grants {action} on {resource}"),
		DecisionReason::CoarseGrant => "granted by role; no instance data checked".to_string(),
		DecisionReason::Unconditional => "granted by an unconditional rule".to_string(),
		DecisionReason::ConditionsMet => "all conditions held".to_string(),
		DecisionReason::ConditionFailed { condition } => {
			format!("condition {condition} did not hold")
		}
	};
	format!("{verdict}: {role} {action} {resource} ({why})")
}

pub fn render_policy(table: &PolicyTable, role: Option<Role>) -> String {
	let roles: Vec<Role> = match role {
		Some(role) => vec![role],
		None => Role::all().to_vec(),
	};

	let mut out = String::new();
	for role in roles {
		let _ = writeln!(out, "[{role}]");
		if role == Role::SuperAdmin {
			let _ = writeln!(out, "  bypasses all rules");
			continue;
		}

		let mut any = false;
		for rule in table.rules_for_role(role) {
			any = true;
			let _ = writeln!(out, "  rule  {rule}");
		}
		if !any {
			let _ = writeln!(out, "  no rules");
			continue;
		}

		let cache = PermissionCache::build(table, role);
		for (resource, actions) in cache.iter() {
			let actions: Vec<&str> = actions.iter().map(Action::as_str).collect();
			let _ = writeln!(out, "  grant {resource}: {}", actions.join(", "));
		}
	}
	out
}

pub async fn grant(config: &AuthzConfig, subject: String, role: Role) -> anyhow::Result<String> {
	let store = open_store(config).await?;
	let subject = SubjectId::new(subject);
	store.assign_role(&subject, role).await?;
	Ok(format!("{subject} is now {role}"))
}

pub async fn revoke(config: &AuthzConfig, subject: String) -> anyhow::Result<String> {
	let store = open_store(config).await?;
	let subject = SubjectId::new(subject);
	store.revoke_role(&subject).await?;
	Ok(format!("{subject} has no stored role"))
}

pub async fn list_roles(config: &AuthzConfig) -> anyhow::Result<String> {
	let store = open_store(config).await?;
	let mut out = String::new();
	for assignment in store.list_roles().await? {
		let _ = writeln!(
			out,
			"{}\t{}\t{}",
			assignment.user_id,
			assignment.role,
			assignment.updated_at.to_rfc3339()
		);
	}
	Ok(out)
}
