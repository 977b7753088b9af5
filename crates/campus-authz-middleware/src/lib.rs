// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP boundary for campus-authz.
//!
//! Authorization at the HTTP edge is two-tier:
//!
//! 1. **Route-level**: [`RequireGate`] applies a coarse [`campus_authz::Gate`]
//!    to whole routes
//! 2. **Handler-level**: [`CurrentAccess`] hands the snapshot to the handler,
//!    which checks instance data with [`campus_authz::authorize!`] and maps
//!    failures to [`Forbidden`]
//!
//! Both tiers read an `Arc<Access>` from request extensions. Requests without
//! one get 401; failing checks get 403 with
//! `{"error":"forbidden","message":"Permission denied"}`.

mod layer;
mod response;

pub use layer::{RequireGate, RequireGateFuture, RequireGateService};
pub use response::{CurrentAccess, ErrorResponse, Forbidden};

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::{to_bytes, Body},
		http::{Request, StatusCode},
		routing::get,
		Router,
	};
	use campus_authz::{
		authorize, Access, Action, CourseAttrs, Gate, PolicyTable, Resource, ResourceData, Role,
		Subject,
	};
	use std::sync::Arc;
	use tower::ServiceExt;

	async fn dummy_handler() -> &'static str {
		"ok"
	}

	fn access(id: &str, role: Role) -> Arc<Access> {
		Arc::new(Access::for_subject(
			PolicyTable::builtin(),
			Subject::new(id, role),
		))
	}

	fn request(access: Option<Arc<Access>>) -> Request<Body> {
		let mut req = Request::get("/").body(Body::empty()).unwrap();
		if let Some(access) = access {
			req.extensions_mut().insert(access);
		}
		req
	}

	async fn body_json(resp: axum::response::Response) -> serde_json::Value {
		let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	mod route_layer {
		use super::*;

		#[tokio::test]
		async fn admin_gate_allows_admin() {
			let app = Router::new()
				.route("/", get(dummy_handler))
				.layer(RequireGate::admin());

			let resp = app.oneshot(request(Some(access("a1", Role::Admin)))).await.unwrap();
			assert_eq!(resp.status(), StatusCode::OK);
		}

		#[tokio::test]
		async fn admin_gate_denies_student_with_json_body() {
			let app = Router::new()
				.route("/", get(dummy_handler))
				.layer(RequireGate::admin());

			let resp = app
				.oneshot(request(Some(access("s1", Role::Student))))
				.await
				.unwrap();
			assert_eq!(resp.status(), StatusCode::FORBIDDEN);
			assert_eq!(
				body_json(resp).await,
				serde_json::json!({ "error": "forbidden", "message": "Permission denied" })
			);
		}

		#[tokio::test]
		async fn missing_access_is_unauthorized() {
			let app = Router::new()
				.route("/", get(dummy_handler))
				.layer(RequireGate::permission(Action::Read, Resource::Course));

			let resp = app.oneshot(request(None)).await.unwrap();
			assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
		}

		#[tokio::test]
		async fn permission_gate_uses_coarse_check() {
			let app = Router::new()
				.route("/", get(dummy_handler))
				.layer(RequireGate::permission(Action::Read, Resource::Analytics));

			let resp = app
				.clone()
				.oneshot(request(Some(access("i1", Role::Instructor))))
				.await
				.unwrap();
			assert_eq!(resp.status(), StatusCode::OK);

			let resp = app
				.oneshot(request(Some(access("s1", Role::Student))))
				.await
				.unwrap();
			assert_eq!(resp.status(), StatusCode::FORBIDDEN);
		}

		#[tokio::test]
		async fn guest_snapshot_passes_public_gate() {
			let guest = Arc::new(Access::for_subject(PolicyTable::builtin(), Subject::guest()));
			let app = Router::new()
				.route("/", get(dummy_handler))
				.layer(RequireGate::new(
					Gate::new().require_permission(Action::Read, Resource::Blog),
				));

			let resp = app.oneshot(request(Some(guest))).await.unwrap();
			assert_eq!(resp.status(), StatusCode::OK);
		}
	}

	mod handler {
		use super::*;

		async fn update_course(CurrentAccess(access): CurrentAccess) -> Result<&'static str, Forbidden> {
			let course = ResourceData::from(CourseAttrs::default().with_instructor("i1"));
			authorize!(&access, Action::Update, Resource::Course, &course)?;
			Ok("updated")
		}

		fn app() -> Router {
			Router::new().route("/", get(update_course))
		}

		#[tokio::test]
		async fn owner_passes_instance_check() {
			let resp = app()
				.oneshot(request(Some(access("i1", Role::Instructor))))
				.await
				.unwrap();
			assert_eq!(resp.status(), StatusCode::OK);
		}

		#[tokio::test]
		async fn non_owner_is_forbidden() {
			let resp = app()
				.oneshot(request(Some(access("i2", Role::Instructor))))
				.await
				.unwrap();
			assert_eq!(resp.status(), StatusCode::FORBIDDEN);
		}

		#[tokio::test]
		async fn extractor_rejects_missing_access() {
			let resp = app().oneshot(request(None)).await.unwrap();
			assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
			assert_eq!(body_json(resp).await["error"], "unauthorized");
		}
	}
}
