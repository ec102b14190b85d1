//! Signup and the generic user CRUD routes
//!
//! Persistence goes through the `ClassCrud` capability. This module adds the
//! user rules around it: field validation, unique usernames and emails,
//! password hashing, email verification tokens, ownership checks, and
//! session handling.

use axum::http::StatusCode;
use chrono::Utc;
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

use crate::UsersRouter;
use crate::auth::{HASHED_PASSWORD, PASSWORD_CHANGED_AT};
use crate::prelude::*;
use parlay_core::{
	RestRequest, password,
	rest::{validate_field_names, validate_query_keys},
	session::{self, CreatedWith},
	user_controller,
};
use parlay_types::{
	database_adapter::FindOptions,
	query::Query,
	types::{USER_CLASS, encode_date, is_truthy},
};

pub const DEFAULT_FIND_LIMIT: usize = 100;

static EMAIL: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"^.+@.+$"));

/// Response of a create request
#[derive(Debug)]
pub struct CreateResponse {
	pub status: StatusCode,
	pub body: Value,
	/// URL of the created object
	pub location: Option<String>,
}

fn bad_username() -> Error {
	Error::api(ErrorCode::UsernameMissing, "bad or missing username")
}

fn object_id(object: &RestObject) -> Option<&str> {
	object.get("objectId").and_then(Value::as_str)
}

pub fn is_valid_email(email: &str) -> bool {
	match &*EMAIL {
		Ok(re) => re.is_match(email),
		Err(_) => false,
	}
}

fn body_object(req: &RestRequest) -> ClResult<RestObject> {
	match &req.body {
		Value::Object(obj) => Ok(obj.clone()),
		_ => Err(Error::api(ErrorCode::InvalidJson, "request body must be a JSON object")),
	}
}

fn parse_paging(req: &RestRequest, name: &str) -> ClResult<Option<usize>> {
	req.query
		.get(name)
		.map(|v| {
			v.parse::<usize>()
				.map_err(|_| Error::api(ErrorCode::InvalidQuery, format!("Invalid {}", name)))
		})
		.transpose()
}

impl UsersRouter {
	/// Checks client-written fields: names and email verification
	fn validate_client_fields(req: &RestRequest, body: &RestObject) -> ClResult<()> {
		validate_field_names(body)?;
		if !req.auth.is_master && body.contains_key("emailVerified") {
			return Err(Error::api(
				ErrorCode::OperationForbidden,
				"Clients aren't allowed to manually update email verification.",
			));
		}
		Ok(())
	}

	/// Fails when another user already has `value` in `field`
	async fn ensure_unique(
		&self,
		field: &str,
		value: &str,
		except_id: Option<&str>,
		error: Error,
	) -> ClResult<()> {
		let users =
			self.app.database.find(USER_CLASS, &Query::eq(field, value), &FindOptions::limit(2)).await?;
		if users.iter().any(|user| object_id(user) != except_id) {
			return Err(error);
		}
		Ok(())
	}

	/// Validates `username` and `email` values of a create or update body
	pub(crate) async fn check_user_fields(
		&self,
		body: &RestObject,
		except_id: Option<&str>,
	) -> ClResult<()> {
		if let Some(username) = body.get("username") {
			let username = username.as_str().filter(|u| !u.is_empty()).ok_or_else(bad_username)?;
			let taken = Error::api(ErrorCode::UsernameTaken, "Account already exists for this username.");
			self.ensure_unique("username", username, except_id, taken).await?;
		}

		if let Some(email) = body.get("email").filter(|v| !v.is_null()) {
			let email = email.as_str().filter(|e| is_valid_email(e)).ok_or_else(|| {
				Error::api(ErrorCode::InvalidEmailAddress, "Email address format is invalid.")
			})?;
			let taken =
				Error::api(ErrorCode::EmailTaken, "Account already exists for this email address.");
			self.ensure_unique("email", email, except_id, taken).await?;
		}
		Ok(())
	}

	/// Replaces a plaintext `password` field by its hash
	///
	/// Returns whether the body carried a password.
	pub(crate) async fn prepare_password(&self, body: &mut RestObject) -> ClResult<bool> {
		let Some(password) = body.remove("password") else {
			return Ok(false);
		};
		let password = password
			.as_str()
			.filter(|p| !p.is_empty())
			.ok_or_else(|| Error::api(ErrorCode::PasswordMissing, "password is required"))?;

		let hash =
			password::hash_password(&self.app.worker, password.into(), self.app.config.bcrypt_cost)
				.await?;
		body.insert(HASHED_PASSWORD.into(), Value::from(&*hash));
		if self.app.config.max_password_age().is_some() {
			body.insert(PASSWORD_CHANGED_AT.into(), encode_date(Utc::now()));
		}
		Ok(true)
	}

	/// Prepares a user object for a caller: hidden fields are removed, file
	/// URLs are filled in, and only the user itself or the master key sees
	/// its authData
	fn clean_for_caller(&self, user: &mut RestObject, req: &RestRequest, current_id: Option<&str>) {
		user.remove("password");
		Self::remove_hidden_properties(user);
		if !req.auth.is_master && (current_id.is_none() || object_id(user) != current_id) {
			user.remove("authData");
		}
		self.files.expand_files_in_rest_object(&self.files_config(), user);
	}

	/// Stores a prepared user, sends the verification email, and opens the
	/// signup session
	pub(crate) async fn create_user(
		&self,
		req: &RestRequest,
		mut user: RestObject,
		auth_provider: &str,
	) -> ClResult<CreateResponse> {
		let created = self.crud.create(USER_CLASS, user.clone()).await?;
		user.insert("objectId".into(), created.object_id.clone().into());

		let config = &self.app.config;
		if config.verify_user_emails && user.get("email").is_some_and(Value::is_string) {
			if let Err(err) = user_controller::send_verification_email(&self.app, &user).await {
				warn!("failed to send verification email: {}", err);
			}
		}

		let mut body = json!({ "objectId": created.object_id, "createdAt": created.created_at });
		if !(config.verify_user_emails && config.prevent_login_with_unverified_email) {
			let created_with = CreatedWith { action: "signup", auth_provider };
			let session_token = session::create_session(
				&self.app,
				&created.object_id,
				created_with,
				req.info.installation_id.as_deref(),
			)
			.await?;
			body["sessionToken"] = session_token.into();
		}

		Ok(CreateResponse {
			status: StatusCode::CREATED,
			body,
			location: Some(format!("{}/users/{}", config.mount, created.object_id)),
		})
	}

	/// POST /users
	pub async fn handle_create(&self, req: &RestRequest) -> ClResult<CreateResponse> {
		let mut body = body_object(req)?;
		Self::validate_client_fields(req, &body)?;

		if Self::has_auth_data(&body) {
			return self.handle_auth_data_signup(req, body).await;
		}

		if !body.get("username").and_then(Value::as_str).is_some_and(|u| !u.is_empty()) {
			return Err(bad_username());
		}
		if !is_truthy(body.get("password")) {
			return Err(Error::api(ErrorCode::PasswordMissing, "password is required"));
		}
		self.check_user_fields(&body, None).await?;
		self.prepare_password(&mut body).await?;
		if body.get("email").is_some_and(Value::is_string) {
			user_controller::set_email_verify_token(&self.app, &mut body);
		}

		self.create_user(req, body, "password").await
	}

	/// GET /users
	pub async fn handle_find(&self, req: &RestRequest) -> ClResult<Value> {
		let query = match req.query.get("where") {
			Some(where_clause) => {
				let value: Value = serde_json::from_str(where_clause).map_err(|_| {
					Error::api(ErrorCode::InvalidJson, "Improper encode of parameter")
				})?;
				Query::from_json(&value)?
			}
			None => Query::all(),
		};
		if !req.auth.is_master {
			validate_query_keys(&query)?;
		}
		let opts = FindOptions {
			limit: Some(parse_paging(req, "limit")?.unwrap_or(DEFAULT_FIND_LIMIT)),
			skip: parse_paging(req, "skip")?.unwrap_or(0),
		};

		let current = self.current_user(req).await?;
		let current_id = current.as_ref().and_then(object_id);

		let mut results = self.crud.find(USER_CLASS, &query, &opts).await?;
		for user in &mut results {
			self.clean_for_caller(user, req, current_id);
		}
		Ok(json!({ "results": results }))
	}

	/// GET /users/{objectId}
	pub async fn handle_get(&self, req: &RestRequest, id: &str) -> ClResult<Value> {
		let current = self.current_user(req).await?;
		let mut user = self.crud.get(USER_CLASS, id).await?;
		self.clean_for_caller(&mut user, req, current.as_ref().and_then(object_id));
		Ok(Value::Object(user))
	}

	/// PUT /users/{objectId}
	pub async fn handle_update(&self, req: &RestRequest, id: &str) -> ClResult<Value> {
		let current = self.current_user(req).await?;
		if !req.auth.is_master && current.as_ref().and_then(object_id) != Some(id) {
			return Err(Error::api(ErrorCode::SessionMissing, format!("Cannot modify user {}.", id)));
		}

		let mut body = body_object(req)?;
		Self::validate_client_fields(req, &body)?;
		let stored = self.crud.get(USER_CLASS, id).await?;

		self.check_user_fields(&body, Some(id)).await?;
		if let Some(Value::Object(auth_data)) = body.get("authData") {
			self.validate_auth_data(auth_data).await?;
		}
		let password_changed = self.prepare_password(&mut body).await?;

		let new_email = body.get("email").and_then(Value::as_str);
		let email_changed = new_email.is_some() && new_email != stored.get("email").and_then(Value::as_str);
		if email_changed {
			user_controller::set_email_verify_token(&self.app, &mut body);
		}

		let result = self.crud.update(USER_CLASS, id, body.clone()).await?;

		if password_changed {
			session::destroy_user_sessions(&self.app, id, req.session_token()).await?;
		}
		if email_changed && self.app.config.verify_user_emails {
			let mut user = stored;
			user.extend(body);
			if let Err(err) = user_controller::send_verification_email(&self.app, &user).await {
				warn!("failed to send verification email: {}", err);
			}
		}

		Ok(json!({ "updatedAt": result.updated_at }))
	}

	/// DELETE /users/{objectId}
	pub async fn handle_delete(&self, req: &RestRequest, id: &str) -> ClResult<Value> {
		if !req.auth.is_master {
			let Some(current) = self.current_user(req).await? else {
				return Err(Error::api(ErrorCode::SessionMissing, "Insufficient auth to delete user"));
			};
			if object_id(&current) != Some(id) {
				return Err(Error::api(ErrorCode::ObjectNotFound, "Object not found."));
			}
		}

		self.crud.delete(USER_CLASS, id).await?;
		session::destroy_user_sessions(&self.app, id, None).await?;
		Ok(json!({}))
	}
}


// vim: ts=4
