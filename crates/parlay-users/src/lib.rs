//! Users router
//!
//! Handles the user-related REST routes: signup and the generic user CRUD,
//! password and third-party login, logout, the current user, password reset
//! and verification email requests.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod auth;
pub mod auth_data;
pub mod crud;
pub mod handler;

mod prelude {
	pub use parlay_core::prelude::*;
}

use axum::{
	Router,
	extract::FromRef,
	routing::{get, post},
};
use std::sync::Arc;

use crate::prelude::*;
use parlay_core::{RestRequest, rest::ClassCrud, session};
use parlay_file::FilesController;
use parlay_types::files_adapter::FilesConfig;

/// The users router: a generic class CRUD capability plus the user routes
#[derive(Clone, Debug)]
pub struct UsersRouter {
	app: App,
	crud: Arc<dyn ClassCrud>,
	files: FilesController,
}

impl FromRef<UsersRouter> for App {
	fn from_ref(router: &UsersRouter) -> App {
		router.app.clone()
	}
}

impl UsersRouter {
	pub fn new(app: App, crud: Arc<dyn ClassCrud>) -> Self {
		let files = FilesController::from_app(&app);
		Self { app, crud, files }
	}

	pub fn class_name(&self) -> &'static str {
		parlay_types::types::USER_CLASS
	}

	/// Strips every key that is not a valid field name (`_` prefixed and
	/// other internal keys), except `__type`
	pub fn remove_hidden_properties(object: &mut RestObject) {
		parlay_core::rest::remove_hidden_properties(object);
	}

	pub fn routes(self) -> Router {
		Router::new()
			.route("/users", get(handler::find).post(handler::create))
			.route("/users/me", get(handler::me))
			.route(
				"/users/{object_id}",
				get(handler::get).put(handler::update).delete(handler::delete),
			)
			.route("/login", get(handler::log_in).post(handler::log_in))
			.route("/logout", post(handler::log_out))
			.route("/requestPasswordReset", post(handler::reset_request))
			.route("/verificationEmailRequest", post(handler::verification_email_request))
			.route("/verifyPassword", get(handler::verify_password))
			.with_state(self)
	}

	fn files_config(&self) -> FilesConfig {
		self.app.files_config()
	}

	/// The user owning the request's session, if it carries a session token
	async fn current_user(&self, req: &RestRequest) -> ClResult<Option<RestObject>> {
		match req.session_token() {
			Some(token) => Ok(Some(session::user_for_session_token(&self.app, token).await?)),
			None => Ok(None),
		}
	}
}

// vim: ts=4
