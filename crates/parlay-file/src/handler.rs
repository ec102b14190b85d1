//! HTTP handlers for the `/files` routes

use axum::{
	Json,
	body::{Body, Bytes},
	extract::{Path, State},
	http::{HeaderMap, StatusCode, header},
	response::{IntoResponse, Response},
};

use crate::controller::{self, FilesController};
use crate::prelude::*;
use parlay_core::MasterAuth;
use parlay_types::files_adapter::FileInfo;

/// POST /files/{filename}
pub async fn post_file(
	State(app): State<App>,
	Path(filename): Path<String>,
	headers: HeaderMap,
	body: Bytes,
) -> ClResult<(StatusCode, [(header::HeaderName, String); 1], Json<FileInfo>)> {
	controller::validate_filename(&filename)?;
	if body.is_empty() {
		return Err(Error::api(ErrorCode::FileSaveError, "Invalid file upload."));
	}
	let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());

	let files = FilesController::from_app(&app);
	let info = files
		.create_file(&app.files_config(), &filename, &body, content_type)
		.await
		.map_err(|err| {
			warn!("file upload failed: {}", err);
			Error::api(ErrorCode::FileSaveError, format!("Could not store file: {}.", filename))
		})?;

	info!("stored file {} ({} bytes)", info.name, body.len());
	Ok((StatusCode::CREATED, [(header::LOCATION, info.url.clone())], Json(info)))
}

/// GET /files/{app_id}/{filename}
pub async fn get_file(
	State(app): State<App>,
	Path((app_id, filename)): Path<(String, String)>,
) -> ClResult<Response> {
	if *app_id != *app.config.application_id {
		return Err(Error::Forbidden("Invalid application ID.".into()));
	}

	let files = FilesController::from_app(&app);
	let stream = match files.get_file_stream(&filename).await {
		Ok(stream) => stream,
		Err(err) => {
			debug!("file {} not readable: {}", filename, err);
			return Ok((StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain")], "File not found.")
				.into_response());
		}
	};

	let content_type =
		controller::content_type_for_filename(&filename).unwrap_or("application/octet-stream");
	Ok(Response::builder()
		.header(header::CONTENT_TYPE, content_type)
		.body(Body::from_stream(stream))?)
}

/// DELETE /files/{filename}
pub async fn delete_file(
	State(app): State<App>,
	_master: MasterAuth,
	Path(filename): Path<String>,
) -> ClResult<Json<serde_json::Value>> {
	FilesController::from_app(&app).delete_file(&filename).await.map_err(|err| {
		warn!("file delete failed: {}", err);
		Error::api(ErrorCode::FileDeleteError, "Could not delete file.")
	})?;
	Ok(Json(serde_json::json!({})))
}

// vim: ts=4
