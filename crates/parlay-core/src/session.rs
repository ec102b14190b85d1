//! Sessions
//!
//! A session is a `_Session` object holding a random `r:` token, a pointer
//! to its user, how it was created, and when it expires.

use chrono::{Duration, Utc};
use serde_json::{Value, json};

use crate::prelude::*;
use crate::rest::{ClassCrud, DatabaseCrud};
use parlay_types::{
	database_adapter::FindOptions,
	query::Query,
	types::{SESSION_CLASS, USER_CLASS, decode_date, encode_date, pointer, pointer_id},
	utils,
};

/// How a session came to be (`createdWith` field)
#[derive(Clone, Copy, Debug)]
pub struct CreatedWith<'a> {
	/// `login` or `signup`
	pub action: &'a str,
	/// `password` or the name of an auth provider
	pub auth_provider: &'a str,
}

fn invalid_session_token() -> Error {
	Error::api(ErrorCode::InvalidSessionToken, "Invalid session token")
}

/// Creates a session for a user and returns its token
pub async fn create_session(
	app: &App,
	user_id: &str,
	created_with: CreatedWith<'_>,
	installation_id: Option<&str>,
) -> ClResult<String> {
	let session_token = utils::new_session_token();
	let expires_at = Utc::now() + Duration::seconds(app.config.session_length);

	let mut session = RestObject::new();
	session.insert("sessionToken".into(), session_token.clone().into());
	session.insert("user".into(), pointer(USER_CLASS, user_id));
	session.insert(
		"createdWith".into(),
		json!({ "action": created_with.action, "authProvider": created_with.auth_provider }),
	);
	session.insert("restricted".into(), false.into());
	session.insert("expiresAt".into(), encode_date(expires_at));
	if let Some(id) = installation_id {
		session.insert("installationId".into(), id.into());
	}

	DatabaseCrud::new(app.database.clone()).create(SESSION_CLASS, session).await?;
	Ok(session_token)
}

pub async fn find_session(app: &App, session_token: &str) -> ClResult<Option<RestObject>> {
	app.database.find_one(SESSION_CLASS, &Query::eq("sessionToken", session_token)).await
}

/// Resolves a session token to its user
///
/// Missing, expired, and dangling sessions are all `INVALID_SESSION_TOKEN`.
pub async fn user_for_session_token(app: &App, session_token: &str) -> ClResult<RestObject> {
	let session = find_session(app, session_token).await?.ok_or_else(invalid_session_token)?;

	let expired =
		session.get("expiresAt").and_then(decode_date).is_some_and(|expires| expires < Utc::now());
	if expired {
		return Err(Error::api(ErrorCode::InvalidSessionToken, "Session token is expired."));
	}

	let user_id = session
		.get("user")
		.and_then(|user| pointer_id(user, USER_CLASS))
		.ok_or_else(invalid_session_token)?;
	app.database
		.find_one(USER_CLASS, &Query::eq("objectId", user_id))
		.await?
		.ok_or_else(invalid_session_token)
}

/// Deletes the session with the given token, returns whether one existed
pub async fn destroy_session(app: &App, session_token: &str) -> ClResult<bool> {
	let count = app.database.delete(SESSION_CLASS, &Query::eq("sessionToken", session_token)).await?;
	Ok(count > 0)
}

/// Deletes every session of a user except the one with token `keep`
pub async fn destroy_user_sessions(app: &App, user_id: &str, keep: Option<&str>) -> ClResult<u64> {
	let sessions = app
		.database
		.find(SESSION_CLASS, &Query::eq("user", pointer(USER_CLASS, user_id)), &FindOptions::default())
		.await?;

	let mut count = 0;
	for session in sessions {
		let token = session.get("sessionToken").and_then(Value::as_str);
		if token.is_some() && token == keep {
			continue;
		}
		if let Some(id) = session.get("objectId").and_then(Value::as_str) {
			count += app.database.delete(SESSION_CLASS, &Query::eq("objectId", id)).await?;
		}
	}
	Ok(count)
}

// vim: ts=4
