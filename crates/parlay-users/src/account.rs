//! Password reset and verification email requests

use serde_json::{Value, json};

use crate::UsersRouter;
use crate::prelude::*;
use parlay_core::{RestRequest, user_controller};
use parlay_types::{
	query::Query,
	types::{USER_CLASS, is_truthy},
};

impl UsersRouter {
	fn throw_on_bad_email_config(&self) -> ClResult<()> {
		self.app.config.validate_email_configuration(self.app.email_adapter.is_some()).map_err(|err| {
			debug!("email configuration: {}", err);
			Error::api(
				ErrorCode::InternalServerError,
				"An appName, publicServerURL, and emailAdapter are required for password reset and email verification functionality.",
			)
		})
	}

	/// The `email` of the request body, validated
	fn email_from_body(req: &RestRequest) -> ClResult<&str> {
		let email = req.body_field("email");
		if !is_truthy(email) {
			return Err(Error::api(ErrorCode::EmailMissing, "you must provide an email"));
		}
		email.and_then(Value::as_str).ok_or_else(|| {
			Error::api(ErrorCode::InvalidEmailAddress, "you must provide a valid email string")
		})
	}

	/// POST /requestPasswordReset
	pub async fn handle_reset_request(&self, req: &RestRequest) -> ClResult<Value> {
		self.throw_on_bad_email_config()?;
		let email = Self::email_from_body(req)?;

		match user_controller::send_password_reset_email(&self.app, email).await {
			Ok(()) => Ok(json!({})),
			Err(err) if err.is_code(ErrorCode::ObjectNotFound) => Err(Error::api(
				ErrorCode::EmailNotFound,
				format!("No user found with email {}.", email),
			)),
			Err(err) => Err(err),
		}
	}

	/// POST /verificationEmailRequest
	pub async fn handle_verification_email_request(&self, req: &RestRequest) -> ClResult<Value> {
		self.throw_on_bad_email_config()?;
		let email = Self::email_from_body(req)?;

		let Some(mut user) = self.app.database.find_one(USER_CLASS, &Query::eq("email", email)).await?
		else {
			return Err(Error::api(
				ErrorCode::EmailNotFound,
				format!("No user found with email {}", email),
			));
		};
		user.remove("password");

		if is_truthy(user.get("emailVerified")) {
			return Err(Error::api(
				ErrorCode::OtherCause,
				format!("Email {} is already verified.", email),
			));
		}

		user_controller::regenerate_email_verify_token(&self.app, &mut user).await?;
		if let Err(err) = user_controller::send_verification_email(&self.app, &user).await {
			warn!("failed to send verification email to {}: {}", email, err);
		}
		Ok(json!({}))
	}
}

// vim: ts=4
