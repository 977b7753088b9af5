// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON rejection bodies and the handler-side access extractor.

use axum::{
	extract::FromRequestParts,
	http::{request::Parts, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use campus_authz::{Access, AccessDenied};
use serde::Serialize;
use std::sync::Arc;

/// Body of every 401/403 produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

pub(crate) fn unauthorized_response() -> Response {
	(
		StatusCode::UNAUTHORIZED,
		Json(ErrorResponse {
			error: "unauthorized".to_string(),
			message: "Authentication required".to_string(),
		}),
	)
		.into_response()
}

pub(crate) fn forbidden_response() -> Response {
	(
		StatusCode::FORBIDDEN,
		Json(ErrorResponse {
			error: "forbidden".to_string(),
			message: "Permission denied".to_string(),
		}),
	)
		.into_response()
}

/// A failed handler-level check, rendered as 403 Forbidden.
///
/// Converts from [`AccessDenied`] so handlers can use `?` on
/// [`campus_authz::authorize!`]. The denial reason is logged by the engine
/// and never sent to the client.
#[derive(Debug, Clone)]
pub struct Forbidden;

impl From<AccessDenied> for Forbidden {
	fn from(denied: AccessDenied) -> Self {
		tracing::info!(role = %denied.role, reason = ?denied.reason, "handler check denied");
		Forbidden
	}
}

impl IntoResponse for Forbidden {
	fn into_response(self) -> Response {
		forbidden_response()
	}
}

/// Extracts the [`Access`] snapshot placed in request extensions by an
/// upstream layer. Rejects with 401 when there is none.
#[derive(Debug, Clone)]
pub struct CurrentAccess(pub Arc<Access>);

impl<S> FromRequestParts<S> for CurrentAccess
where
	S: Send + Sync,
{
	type Rejection = Response;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<Arc<Access>>()
			.cloned()
			.map(CurrentAccess)
			.ok_or_else(unauthorized_response)
	}
}
