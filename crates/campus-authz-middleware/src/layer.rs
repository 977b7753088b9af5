// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{body::Body, http::Request, response::Response};
use campus_authz::{Access, Action, Gate, Resource, Role};
use pin_project_lite::pin_project;
use std::{
	future::Future,
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::response::{forbidden_response, unauthorized_response};

/// Route layer enforcing a [`Gate`] against the request's [`Access`].
///
/// The snapshot is read from request extensions as `Arc<Access>`; putting it
/// there is the job of whatever authenticates the request.
///
/// # Security
///
/// - Rejects requests without an access snapshot with 401
/// - Rejects requests failing the gate with 403
/// - Logs denials with subject ID and role
///
/// # Example
///
/// ```ignore
/// Router::new()
///     .route("/admin", get(admin_dashboard))
///     .route_layer(RequireGate::any_role([Role::Admin, Role::SuperAdmin]))
///     .route("/analytics", get(analytics))
///     .route_layer(RequireGate::permission(Action::Read, Resource::Analytics));
/// ```
#[derive(Clone)]
pub struct RequireGate {
	gate: Arc<Gate>,
}

impl RequireGate {
	pub fn new(gate: Gate) -> Self {
		Self {
			gate: Arc::new(gate),
		}
	}

	/// Require any one of `roles`.
	pub fn any_role(roles: impl IntoIterator<Item = Role>) -> Self {
		Self::new(Gate::new().require_any_role(roles))
	}

	/// Require a coarse permission.
	pub fn permission(action: Action, resource: Resource) -> Self {
		Self::new(Gate::new().require_permission(action, resource))
	}

	/// Require `admin` or `super_admin`.
	pub fn admin() -> Self {
		Self::any_role([Role::Admin, Role::SuperAdmin])
	}
}

impl<S> Layer<S> for RequireGate {
	type Service = RequireGateService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireGateService {
			inner,
			gate: Arc::clone(&self.gate),
		}
	}
}

/// Service wrapper for [`RequireGate`] layer.
#[derive(Clone)]
pub struct RequireGateService<S> {
	inner: S,
	gate: Arc<Gate>,
}

impl<S> Service<Request<Body>> for RequireGateService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequireGateFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let Some(access) = req.extensions().get::<Arc<Access>>().cloned() else {
			tracing::debug!(
				roles = ?self.gate.roles(),
				permission = ?self.gate.permission(),
				"gate denied: no access snapshot"
			);
			return RequireGateFuture::Rejected {
				resp: Some(unauthorized_response()),
			};
		};

		if let Err(denied) = self.gate.guard(&access) {
			tracing::info!(
				subject_id = access.subject_id().map(|id| id.as_str()),
				role = %access.role(),
				roles = ?self.gate.roles(),
				permission = ?self.gate.permission(),
				reason = ?denied.reason,
				"gate denied"
			);
			return RequireGateFuture::Rejected {
				resp: Some(forbidden_response()),
			};
		}

		tracing::debug!(role = %access.role(), "gate passed");

		RequireGateFuture::Inner {
			fut: self.inner.call(req),
		}
	}
}

pin_project! {
	/// Future for [`RequireGateService`].
	#[project = RequireGateFutureProj]
	pub enum RequireGateFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequireGateFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequireGateFutureProj::Inner { fut } => fut.poll(cx),
			RequireGateFutureProj::Rejected { resp } => {
				Poll::Ready(Ok(resp.take().unwrap_or_else(forbidden_response)))
			}
		}
	}
}
