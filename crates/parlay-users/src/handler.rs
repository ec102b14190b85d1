//! HTTP handlers for the users routes

use axum::{
	Json,
	extract::{Path, State},
	http::header,
	response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::UsersRouter;
use crate::prelude::*;
use parlay_core::RestRequest;

/// GET /users
pub async fn find(State(router): State<UsersRouter>, req: RestRequest) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_find(&req).await?))
}

/// POST /users
pub async fn create(State(router): State<UsersRouter>, req: RestRequest) -> ClResult<Response> {
	let created = router.handle_create(&req).await?;
	Ok(match created.location {
		Some(location) => {
			(created.status, [(header::LOCATION, location)], Json(created.body)).into_response()
		}
		None => (created.status, Json(created.body)).into_response(),
	})
}

/// GET /users/me
pub async fn me(State(router): State<UsersRouter>, req: RestRequest) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_me(&req).await?))
}

/// GET /users/{objectId}
pub async fn get(
	State(router): State<UsersRouter>,
	Path(object_id): Path<String>,
	req: RestRequest,
) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_get(&req, &object_id).await?))
}

/// PUT /users/{objectId}
pub async fn update(
	State(router): State<UsersRouter>,
	Path(object_id): Path<String>,
	req: RestRequest,
) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_update(&req, &object_id).await?))
}

/// DELETE /users/{objectId}
pub async fn delete(
	State(router): State<UsersRouter>,
	Path(object_id): Path<String>,
	req: RestRequest,
) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_delete(&req, &object_id).await?))
}

/// GET|POST /login
pub async fn log_in(State(router): State<UsersRouter>, req: RestRequest) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_log_in(&req).await?))
}

/// POST /logout
pub async fn log_out(State(router): State<UsersRouter>, req: RestRequest) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_log_out(&req).await?))
}

/// POST /requestPasswordReset
pub async fn reset_request(
	State(router): State<UsersRouter>,
	req: RestRequest,
) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_reset_request(&req).await?))
}

/// POST /verificationEmailRequest
pub async fn verification_email_request(
	State(router): State<UsersRouter>,
	req: RestRequest,
) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_verification_email_request(&req).await?))
}

/// GET /verifyPassword
pub async fn verify_password(
	State(router): State<UsersRouter>,
	req: RestRequest,
) -> ClResult<Json<Value>> {
	Ok(Json(router.handle_verify_password(&req).await?))
}

// vim: ts=4
