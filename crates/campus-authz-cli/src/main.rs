// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `campus-authz`: inspect authorization decisions and edit the role store.

use campus_authz::{Action, PolicyTable, Resource, Role};
use campus_authz_config::AuthzConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod version;

use commands::CheckArgs;

/// Campus access control.
#[derive(Parser, Debug)]
#[command(
	name = "campus-authz",
	about = "Inspect campus authorization decisions and manage role assignments",
	version
)]
struct Args {
	/// Config file (defaults to /etc/campus/authz.toml)
	#[arg(long, global = true, env = "CAMPUS_AUTHZ_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Decide whether a subject may perform an action
	Check {
		/// Subject ID; omit to check as an anonymous guest
		#[arg(long)]
		subject: Option<String>,

		/// Use this role instead of looking the subject up
		#[arg(long)]
		role: Option<Role>,

		#[arg(long)]
		action: Action,

		#[arg(long)]
		resource: Resource,

		/// Instance attributes as a JSON object, e.g. '{"instructor_id":"u1"}'
		#[arg(long)]
		data: Option<String>,

		/// Print the decision as JSON
		#[arg(long)]
		json: bool,
	},

	/// Print the policy table and the permission cache derived from it
	Policy {
		/// Limit output to one role
		#[arg(long)]
		role: Option<Role>,
	},

	/// Assign a role in the role store
	Grant {
		#[arg(long)]
		subject: String,

		#[arg(long)]
		role: Role,
	},

	/// Remove a subject's stored role
	Revoke {
		#[arg(long)]
		subject: String,
	},

	/// List stored role assignments
	Roles,

	/// Show version and build information
	Version,
}

/// Summarise the resolved config. Called once the subscriber is installed.
fn log_loaded_config(config: &AuthzConfig) {
	tracing::info!(
		database = %config.database.url,
		resolver_timeout_ms = config.resolver.timeout_ms,
		log_level = %config.logging.level,
		"authz configuration loaded"
	);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => campus_authz_config::load_config_with_file(path)?,
		None => campus_authz_config::load_config()?,
	};

	// Logs go to stderr so command output stays pipeable.
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	log_loaded_config(&config);

	let output = match args.command {
		Command::Check {
			subject,
			role,
			action,
			resource,
			data,
			json,
		} => {
			commands::check(
				&config,
				CheckArgs {
					subject,
					role,
					action,
					resource,
					data,
					json,
				},
			)
			.await?
		}
		Command::Policy { role } => commands::render_policy(&PolicyTable::builtin(), role),
		Command::Grant { subject, role } => commands::grant(&config, subject, role).await?,
		Command::Revoke { subject } => commands::revoke(&config, subject).await?,
		Command::Roles => commands::list_roles(&config).await?,
		Command::Version => version::format_version_info(),
	};

	print!("{output}");
	if !output.ends_with('\n') {
		println!();
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn test_cli_definition_is_valid() {
		Args::command().debug_assert();
	}

	#[test]
	fn test_parse_check() {
		let args = Args::parse_from([
			"campus-authz",
			"check",
			"--subject",
			"u1",
			"--action",
			"update",
			"--resource",
			"course",
			"--data",
			r#"{"instructor_id":"u1"}"#,
		]);
		match args.command {
			Command::Check {
				subject,
				action,
				resource,
				data,
				..
			} => {
				assert_eq!(subject.as_deref(), Some("u1"));
				assert_eq!(action, Action::Update);
				assert_eq!(resource, Resource::Course);
				assert!(data.is_some());
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn test_parse_rejects_unknown_role() {
		let result = Args::try_parse_from(["campus-authz", "grant", "--subject", "u1", "--role", "dean"]);
		assert!(result.is_err());
	}

	#[derive(Clone, Default)]
	struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

	impl std::io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn test_loaded_config_summary_reaches_subscriber() {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_writer(move || writer.clone())
			.with_ansi(false)
			.finish();

		tracing::subscriber::with_default(subscriber, || {
			log_loaded_config(&AuthzConfig::default());
		});

		let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
		assert!(out.contains("authz configuration loaded"));
		assert!(out.contains("resolver_timeout_ms=2000"));
	}

	#[test]
	fn test_parse_role_case_insensitively() {
		let args = Args::try_parse_from(["campus-authz", "policy", "--role", "Admin"]).unwrap();
		assert!(matches!(args.command, Command::Policy { role: Some(Role::Admin) }));
	}
}
