//! User controller: email verification and password reset tokens, links,
//! and delivery through the configured email adapter.

use chrono::{Duration, Utc};
use serde_json::Value;

use crate::prelude::*;
use crate::rest::remove_hidden_properties;
use parlay_types::{
	database_adapter::FindOptions,
	email_adapter::{EmailAdapter, EmailMessage},
	query::{Query, UpdateOp},
	types::{USER_CLASS, encode_date},
	utils,
};

pub const EMAIL_VERIFY_TOKEN: &str = "_email_verify_token";
pub const EMAIL_VERIFY_TOKEN_EXPIRES_AT: &str = "_email_verify_token_expires_at";
pub const PERISHABLE_TOKEN: &str = "_perishable_token";
pub const PERISHABLE_TOKEN_EXPIRES_AT: &str = "_perishable_token_expires_at";

const TOKEN_LENGTH: usize = 25;

fn email_adapter(app: &App) -> ClResult<&dyn EmailAdapter> {
	app.email_adapter
		.as_deref()
		.ok_or_else(|| Error::ConfigError("no email adapter is configured".into()))
}

/// `{publicServerURL}/apps/{appId}/{page}?token=...&username=...`
pub fn build_email_link(app: &App, page: &str, username: &str, token: &str) -> String {
	let base = app.config.public_server_url.as_deref().unwrap_or_default().trim_end_matches('/');
	format!(
		"{}/apps/{}/{}?token={}&username={}",
		base,
		app.config.application_id,
		page,
		utils::encode_uri_component(token),
		utils::encode_uri_component(username)
	)
}

fn email_user(user: &RestObject) -> RestObject {
	let mut user = user.clone();
	user.remove("password");
	remove_hidden_properties(&mut user);
	user
}

// Email verification //
//********************//

/// Sets a new email verify token on an unsaved user, when email
/// verification is enabled
pub fn set_email_verify_token(app: &App, user: &mut RestObject) {
	if !app.config.verify_user_emails {
		return;
	}
	user.insert(EMAIL_VERIFY_TOKEN.into(), utils::random_string(TOKEN_LENGTH).into());
	user.insert("emailVerified".into(), false.into());
	if let Some(validity) = app.config.email_verify_token_validity_duration {
		let expires_at = Utc::now() + Duration::seconds(i64::from(validity));
		user.insert(EMAIL_VERIFY_TOKEN_EXPIRES_AT.into(), encode_date(expires_at));
	}
}

/// Replaces the email verify token of a stored user
pub async fn regenerate_email_verify_token(app: &App, user: &mut RestObject) -> ClResult<()> {
	set_email_verify_token(app, user);

	let Some(user_id) = user.get("objectId").and_then(Value::as_str) else {
		return Err(Error::Internal("user without objectId".into()));
	};
	let update: Vec<(Box<str>, UpdateOp)> =
		[EMAIL_VERIFY_TOKEN, EMAIL_VERIFY_TOKEN_EXPIRES_AT, "emailVerified"]
			.into_iter()
			.filter_map(|field| user.get(field).map(|v| (field.into(), UpdateOp::Set(v.clone()))))
			.collect();
	if update.is_empty() {
		return Ok(());
	}
	app.database.update(USER_CLASS, &Query::eq("objectId", user_id), &update).await?;
	Ok(())
}

/// Sends the verification email for a user holding an email verify token
pub async fn send_verification_email(app: &App, user: &RestObject) -> ClResult<()> {
	if !app.config.verify_user_emails {
		return Ok(());
	}
	let adapter = email_adapter(app)?;
	let token = user.get(EMAIL_VERIFY_TOKEN).and_then(Value::as_str).unwrap_or_default();
	let username = user.get("username").and_then(Value::as_str).unwrap_or_default();

	let message = EmailMessage {
		app_name: app.config.app_name.clone().unwrap_or_default(),
		link: build_email_link(app, "verify_email", username, token),
		user: email_user(user),
	};
	adapter.send_verification_email(message).await
}

// Password reset //
//****************//

/// Finds the user an email belongs to: by email, or by a username equal to
/// the email on users without an email field
async fn find_user_by_email(app: &App, email: &str) -> ClResult<Option<RestObject>> {
	if let Some(user) = app.database.find_one(USER_CLASS, &Query::eq("email", email)).await? {
		return Ok(Some(user));
	}
	let candidates =
		app.database.find(USER_CLASS, &Query::eq("username", email), &FindOptions::default()).await?;
	Ok(candidates.into_iter().find(|user| !user.contains_key("email")))
}

/// Stores a fresh password reset token and returns the updated user
pub async fn set_password_reset_token(app: &App, email: &str) -> ClResult<RestObject> {
	let Some(mut user) = find_user_by_email(app, email).await? else {
		return Err(Error::api(ErrorCode::ObjectNotFound, "Object not found."));
	};
	let Some(user_id) = user.get("objectId").and_then(Value::as_str).map(str::to_string) else {
		return Err(Error::Internal("user without objectId".into()));
	};

	let token = utils::random_string(TOKEN_LENGTH);
	let mut update = vec![(Box::<str>::from(PERISHABLE_TOKEN), UpdateOp::Set(token.clone().into()))];
	user.insert(PERISHABLE_TOKEN.into(), token.into());

	let validity = app.config.password_policy.as_ref().and_then(|p| p.reset_token_validity_duration);
	if let Some(validity) = validity {
		let expires_at = encode_date(Utc::now() + Duration::seconds(i64::from(validity)));
		update.push((PERISHABLE_TOKEN_EXPIRES_AT.into(), UpdateOp::Set(expires_at.clone())));
		user.insert(PERISHABLE_TOKEN_EXPIRES_AT.into(), expires_at);
	}

	app.database.update(USER_CLASS, &Query::eq("objectId", user_id.as_str()), &update).await?;
	Ok(user)
}

/// Generates a password reset token and mails the reset link
///
/// Fails with `OBJECT_NOT_FOUND` when no user has the given email.
pub async fn send_password_reset_email(app: &App, email: &str) -> ClResult<()> {
	let adapter = email_adapter(app)?;
	let user = set_password_reset_token(app, email).await?;

	let token = user.get(PERISHABLE_TOKEN).and_then(Value::as_str).unwrap_or_default();
	let username = user.get("username").and_then(Value::as_str).unwrap_or_default();
	let message = EmailMessage {
		app_name: app.config.app_name.clone().unwrap_or_default(),
		link: build_email_link(app, "request_password_reset", username, token),
		user: email_user(&user),
	};
	adapter.send_password_reset_email(message).await
}

// vim: ts=4
