//! Password login, current user, logout, and password verification

use chrono::{Duration, Utc};
use serde_json::{Value, json};

use crate::UsersRouter;
use crate::prelude::*;
use parlay_core::{
	RestRequest, account_lockout, password,
	session::{self, CreatedWith},
};
use parlay_types::{
	database_adapter::FindOptions,
	query::{Query, UpdateOp},
	types::{USER_CLASS, decode_date, encode_date, is_truthy},
};

pub const HASHED_PASSWORD: &str = "_hashed_password";
pub const PASSWORD_CHANGED_AT: &str = "_password_changed_at";

fn invalid_credentials() -> Error {
	Error::api(ErrorCode::ObjectNotFound, "Invalid username/password.")
}

/// Login credentials, taken from the body or, when the body lacks them,
/// from the query string
#[derive(Debug)]
struct Credentials {
	username: Option<Value>,
	email: Option<Value>,
	password: Option<Value>,
}

impl Credentials {
	fn from_request(req: &RestRequest) -> Self {
		let from_body = |name: &str| req.body.get(name).cloned();
		let in_query = |name: &str| req.query.get(name).is_some_and(|v| !v.is_empty());

		let use_query = (!is_truthy(req.body.get("username")) && in_query("username"))
			|| (!is_truthy(req.body.get("email")) && in_query("email"));
		if use_query {
			let from_query = |name: &str| req.query.get(name).map(|v| Value::String(v.clone()));
			Credentials {
				username: from_query("username"),
				email: from_query("email"),
				password: from_query("password"),
			}
		} else {
			Credentials {
				username: from_body("username"),
				email: from_body("email"),
				password: from_body("password"),
			}
		}
	}

	/// Validates presence and types, returning (username, email, password)
	fn validate(&self) -> ClResult<(Option<&str>, Option<&str>, &str)> {
		let username = self.username.as_ref().filter(|v| is_truthy(Some(v)));
		let email = self.email.as_ref().filter(|v| is_truthy(Some(v)));

		if username.is_none() && email.is_none() {
			return Err(Error::api(ErrorCode::UsernameMissing, "username/email is required."));
		}
		if !is_truthy(self.password.as_ref()) {
			return Err(Error::api(ErrorCode::PasswordMissing, "password is required."));
		}

		let password = self.password.as_ref().and_then(Value::as_str);
		let email_str = email.map(Value::as_str);
		let username_str = username.map(Value::as_str);
		match (password, email_str, username_str) {
			(Some(password), Some(Some(_)) | None, Some(Some(_)) | None) => {
				Ok((username_str.flatten(), email_str.flatten(), password))
			}
			_ => Err(invalid_credentials()),
		}
	}
}

/// Lookup filter for the given credentials
pub fn login_query(username: Option<&str>, email: Option<&str>) -> Query {
	match (username, email) {
		(Some(username), Some(email)) => Query::eq("email", email).and("username", username),
		(None, Some(email)) => Query::eq("email", email),
		(username, None) => Query::or(vec![
			Query::eq("username", username.unwrap_or_default()),
			Query::eq("email", username.unwrap_or_default()),
		]),
	}
}

/// Removes the password hash and `null` authData entries from a user
fn clean_user(user: &mut RestObject) {
	user.remove("password");
	user.remove(HASHED_PASSWORD);

	let empty = match user.get_mut("authData") {
		Some(Value::Object(auth_data)) => {
			auth_data.retain(|_, v| !v.is_null());
			auth_data.is_empty()
		}
		_ => false,
	};
	if empty {
		user.remove("authData");
	}
}

impl UsersRouter {
	/// Validates the credentials of a login or password verification request
	/// and returns the matching user
	pub async fn authenticate_user_from_request(&self, req: &RestRequest) -> ClResult<RestObject> {
		let credentials = Credentials::from_request(req);
		let (username, email, password) = credentials.validate()?;

		let results = self
			.app
			.database
			.find(USER_CLASS, &login_query(username, email), &FindOptions::default())
			.await?;

		let mut user = match results.len() {
			0 => return Err(invalid_credentials()),
			1 => results.into_iter().next().ok_or_else(invalid_credentials)?,
			_ => {
				// One user's email may equal another user's username
				warn!(
					"There is a user which email is the same as another user's username, logging in based on username"
				);
				results
					.into_iter()
					.find(|u| username.is_some() && u.get("username").and_then(Value::as_str) == username)
					.ok_or_else(invalid_credentials)?
			}
		};

		let is_valid_password = match user.get(HASHED_PASSWORD).and_then(Value::as_str) {
			Some(hash) => {
				password::compare_password(&self.app.worker, password.into(), hash.into()).await?
			}
			None => false,
		};

		account_lockout::handle_login_attempt(&self.app, &user, is_valid_password).await?;

		if !is_valid_password {
			return Err(invalid_credentials());
		}

		// An empty ACL locks the user out for everyone but the master key
		let empty_acl = user.get("ACL").and_then(Value::as_object).is_some_and(|acl| acl.is_empty());
		if !req.auth.is_master && empty_acl {
			return Err(invalid_credentials());
		}

		let config = &self.app.config;
		if config.verify_user_emails
			&& config.prevent_login_with_unverified_email
			&& !is_truthy(user.get("emailVerified"))
		{
			return Err(Error::api(ErrorCode::EmailNotFound, "User email is not verified."));
		}

		clean_user(&mut user);
		Ok(user)
	}

	/// Rejects logins with an expired password, and starts tracking the
	/// password age of users created before the policy was enabled
	async fn check_password_expiry(&self, user: &RestObject) -> ClResult<()> {
		let Some(max_age) = self.app.config.max_password_age() else {
			return Ok(());
		};

		match user.get(PASSWORD_CHANGED_AT).and_then(decode_date) {
			Some(changed_at) => {
				if changed_at + Duration::days(i64::from(max_age)) < Utc::now() {
					return Err(Error::api(
						ErrorCode::ObjectNotFound,
						"Your password has expired. Please reset your password.",
					));
				}
			}
			None => {
				let Some(user_id) = user.get("objectId").and_then(Value::as_str) else {
					return Ok(());
				};
				let update: [(Box<str>, UpdateOp); 1] =
					[(PASSWORD_CHANGED_AT.into(), UpdateOp::Set(encode_date(Utc::now())))];
				if let Err(err) =
					self.app.database.update(USER_CLASS, &Query::eq("objectId", user_id), &update).await
				{
					warn!("failed to start password age tracking: {}", err);
				}
			}
		}
		Ok(())
	}

	/// GET|POST /login
	pub async fn handle_log_in(&self, req: &RestRequest) -> ClResult<Value> {
		let mut user = self.authenticate_user_from_request(req).await?;
		self.check_password_expiry(&user).await?;

		Self::remove_hidden_properties(&mut user);

		let user_id = user.get("objectId").and_then(Value::as_str).unwrap_or_default().to_string();
		let created_with = CreatedWith { action: "login", auth_provider: "password" };
		let session_token = session::create_session(
			&self.app,
			&user_id,
			created_with,
			req.info.installation_id.as_deref(),
		)
		.await?;
		user.insert("sessionToken".into(), session_token.into());

		self.files.expand_files_in_rest_object(&self.files_config(), &mut user);

		Ok(Value::Object(user))
	}

	/// GET /verifyPassword
	pub async fn handle_verify_password(&self, req: &RestRequest) -> ClResult<Value> {
		let mut user = self.authenticate_user_from_request(req).await?;
		Self::remove_hidden_properties(&mut user);
		Ok(Value::Object(user))
	}

	/// GET /users/me
	pub async fn handle_me(&self, req: &RestRequest) -> ClResult<Value> {
		let Some(session_token) = req.session_token() else {
			return Err(Error::api(ErrorCode::InvalidSessionToken, "Invalid session token"));
		};
		let mut user = session::user_for_session_token(&self.app, session_token).await?;

		// SDKs expect the token back
		user.insert("sessionToken".into(), session_token.into());
		Self::remove_hidden_properties(&mut user);

		Ok(Value::Object(user))
	}

	/// POST /logout
	pub async fn handle_log_out(&self, req: &RestRequest) -> ClResult<Value> {
		if let Some(session_token) = req.session_token() {
			session::destroy_session(&self.app, session_token).await?;
		}
		Ok(json!({}))
	}
}


// vim: ts=4
