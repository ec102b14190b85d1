//! Route assembly

use axum::{
	Router,
	extract::{Request, State},
	middleware::{self, Next},
	response::Response,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::prelude::*;
use parlay_core::{
	extract::HEADER_APPLICATION_ID,
	rest::{ClassCrud, DatabaseCrud},
};
use parlay_users::UsersRouter;

/// Rejects requests without the configured application id
pub async fn require_app_id(State(app): State<App>, req: Request, next: Next) -> ClResult<Response> {
	let app_id = req.headers().get(HEADER_APPLICATION_ID).and_then(|v| v.to_str().ok());
	if app_id != Some(&*app.config.application_id) {
		debug!("rejected request to {} with application id {:?}", req.uri().path(), app_id);
		return Err(Error::Forbidden("unauthorized".into()));
	}
	Ok(next.run(req).await)
}

fn init_api(app: &App) -> Router {
	let crud: Arc<dyn ClassCrud> = Arc::new(DatabaseCrud::new(app.database.clone()));

	let protected_router = Router::new()
		.merge(UsersRouter::new(app.clone(), crud).routes())
		.merge(parlay_file::init_routes(app.clone()))
		.layer(middleware::from_fn_with_state(app.clone(), require_app_id));

	// File downloads carry the application id in their path
	let public_router = parlay_file::init_public_routes(app.clone());

	Router::new().merge(protected_router).merge(public_router)
}

pub fn init(app: App) -> Router {
	let api = init_api(&app);
	let mount_path = app.config.mount_path.trim_end_matches('/');

	let router = if mount_path.is_empty() { api } else { Router::new().nest(mount_path, api) };
	router.layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive())
}

// vim: ts=4
