//! Third-party signup and login through `authData`
//!
//! A create request carrying `authData` is validated by the registered auth
//! providers. A user already linked to the same provider id is logged in,
//! otherwise a new user is created.

use axum::http::StatusCode;
use serde_json::Value;

use crate::UsersRouter;
use crate::crud::CreateResponse;
use crate::prelude::*;
use parlay_core::{
	RestRequest,
	session::{self, CreatedWith},
	user_controller,
};
use parlay_types::{
	auth_provider::auth_data_id,
	database_adapter::FindOptions,
	query::{Query, UpdateOp},
	types::USER_CLASS,
	utils,
};

/// Length of generated usernames
pub const GENERATED_USERNAME_LENGTH: usize = 25;

/// A validated provider entry of `authData`
#[derive(Debug)]
pub(crate) struct ProviderAuth<'a> {
	pub provider: &'a str,
	pub id: String,
}

fn already_linked() -> Error {
	Error::api(ErrorCode::AccountAlreadyLinked, "this auth is already used")
}

impl UsersRouter {
	/// Whether a body has at least one non-null `authData` entry
	pub(crate) fn has_auth_data(body: &RestObject) -> bool {
		body.get("authData")
			.and_then(Value::as_object)
			.is_some_and(|auth_data| auth_data.values().any(|v| !v.is_null()))
	}

	/// Validates every non-null provider entry with its auth provider
	///
	/// `null` entries unlink a provider and are not validated.
	pub(crate) async fn validate_auth_data<'a>(
		&self,
		auth_data: &'a RestObject,
	) -> ClResult<Vec<ProviderAuth<'a>>> {
		let mut providers = Vec::new();
		for (provider, data) in auth_data.iter().filter(|(_, v)| !v.is_null()) {
			let auth_provider = self.app.auth_provider(provider)?;
			auth_provider.validate_app_id(data).await?;
			auth_provider.validate_auth_data(data).await?;

			let id = auth_data_id(data).ok_or_else(|| {
				Error::api(ErrorCode::ObjectNotFound, format!("{} auth data is missing an id.", provider))
			})?;
			providers.push(ProviderAuth { provider, id });
		}
		Ok(providers)
	}

	/// Users linked to any of the given provider ids
	async fn find_users_with_auth_data(
		&self,
		providers: &[ProviderAuth<'_>],
	) -> ClResult<Vec<RestObject>> {
		let query = Query::or(
			providers
				.iter()
				.map(|p| Query::eq(&format!("authData.{}.id", p.provider), p.id.as_str()))
				.collect(),
		);
		self.app.database.find(USER_CLASS, &query, &FindOptions::default()).await
	}

	/// Signup or login of a create request carrying `authData`
	pub(crate) async fn handle_auth_data_signup(
		&self,
		req: &RestRequest,
		mut body: RestObject,
	) -> ClResult<CreateResponse> {
		let Some(Value::Object(mut auth_data)) = body.remove("authData") else {
			return Err(Error::api(ErrorCode::InvalidJson, "authData must be an object"));
		};
		auth_data.retain(|_, v| !v.is_null());

		let providers = self.validate_auth_data(&auth_data).await?;
		let provider_name = providers.first().map_or("anonymous", |p| p.provider).to_string();

		let mut users = self.find_users_with_auth_data(&providers).await?;
		if users.len() > 1 {
			return Err(already_linked());
		}

		if let Some(user) = users.pop() {
			return self.log_in_with_auth_data(req, user, auth_data, &provider_name).await;
		}

		// New user
		self.check_user_fields(&body, None).await?;
		if !body.get("username").is_some_and(Value::is_string) {
			body.insert("username".into(), utils::random_string(GENERATED_USERNAME_LENGTH).into());
		}
		self.prepare_password(&mut body).await?;
		if body.get("email").is_some_and(Value::is_string) {
			user_controller::set_email_verify_token(&self.app, &mut body);
		}
		body.insert("authData".into(), Value::Object(auth_data));

		self.create_user(req, body, &provider_name).await
	}

	/// Logs in a user found by its `authData`, refreshing the stored data
	async fn log_in_with_auth_data(
		&self,
		req: &RestRequest,
		mut user: RestObject,
		auth_data: RestObject,
		provider: &str,
	) -> ClResult<CreateResponse> {
		let Some(user_id) = user.get("objectId").and_then(Value::as_str).map(str::to_string) else {
			return Err(Error::api(ErrorCode::ObjectNotFound, "Object not found."));
		};

		// The request session, if any, must belong to the linked user
		if let Some(current) = self.current_user(req).await? {
			if current.get("objectId").and_then(Value::as_str) != Some(user_id.as_str()) {
				return Err(already_linked());
			}
		}

		let mut merged = user.get("authData").and_then(Value::as_object).cloned().unwrap_or_default();
		merged.extend(auth_data);
		if user.get("authData").and_then(Value::as_object) != Some(&merged) {
			let update: [(Box<str>, UpdateOp); 1] =
				[("authData".into(), UpdateOp::Set(Value::Object(merged.clone())))];
			self.app.database.update(USER_CLASS, &Query::eq("objectId", user_id.as_str()), &update).await?;
		}
		user.insert("authData".into(), Value::Object(merged));

		let created_with = CreatedWith { action: "login", auth_provider: provider };
		let session_token = session::create_session(
			&self.app,
			&user_id,
			created_with,
			req.info.installation_id.as_deref(),
		)
		.await?;

		user.remove("password");
		Self::remove_hidden_properties(&mut user);
		self.files.expand_files_in_rest_object(&self.files_config(), &mut user);
		user.insert("sessionToken".into(), session_token.into());

		Ok(CreateResponse { status: StatusCode::OK, body: Value::Object(user), location: None })
	}
}


// vim: ts=4
