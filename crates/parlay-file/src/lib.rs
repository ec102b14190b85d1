//! File handling: the files controller and its HTTP routes.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod controller;
pub mod handler;

mod prelude {
	pub use parlay_core::prelude::*;
}

pub use controller::FilesController;

use axum::{
	Router,
	routing::{get, post},
};
use parlay_core::App;

/// Routes that need an application id (upload and delete)
pub fn init_routes(app: App) -> Router {
	Router::new()
		.route("/files/{filename}", post(handler::post_file).delete(handler::delete_file))
		.with_state(app)
}

/// Public download route, identified by the application id in the path
pub fn init_public_routes(app: App) -> Router {
	Router::new().route("/files/{app_id}/{filename}", get(handler::get_file)).with_state(app)
}

// vim: ts=4
