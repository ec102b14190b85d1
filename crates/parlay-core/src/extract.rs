//! Request extractors for the REST routes

use axum::{
	body::Bytes,
	extract::{FromRef, FromRequest, FromRequestParts, Request},
	http::{HeaderMap, request::Parts},
};
use serde_json::Value;
use std::collections::HashMap;

use crate::app::AppState;
use crate::prelude::*;

pub const HEADER_SESSION_TOKEN: &str = "x-parse-session-token";
pub const HEADER_INSTALLATION_ID: &str = "x-parse-installation-id";
pub const HEADER_CLIENT_VERSION: &str = "x-parse-client-version";
pub const HEADER_MASTER_KEY: &str = "x-parse-master-key";
pub const HEADER_APPLICATION_ID: &str = "x-parse-application-id";

/// Client information sent along with a request
#[derive(Clone, Debug, Default)]
pub struct RequestInfo {
	pub session_token: Option<Box<str>>,
	pub installation_id: Option<Box<str>>,
	pub client_sdk: Option<Box<str>>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AuthInfo {
	pub is_master: bool,
}

// RestRequest //
//*************//
/// A parsed REST request: JSON body, query parameters, and client info
#[derive(Clone, Debug)]
pub struct RestRequest {
	pub body: Value,
	pub query: HashMap<String, String>,
	pub info: RequestInfo,
	pub auth: AuthInfo,
}

impl RestRequest {
	/// Body field as a JSON value, `None` when missing
	pub fn body_field(&self, name: &str) -> Option<&Value> {
		self.body.get(name)
	}

	pub fn session_token(&self) -> Option<&str> {
		self.info.session_token.as_deref()
	}
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<Box<str>> {
	headers.get(name).and_then(|v| v.to_str().ok()).filter(|v| !v.is_empty()).map(Into::into)
}

/// Whether the request carries the configured master key
pub fn is_master_key(app: &AppState, headers: &HeaderMap) -> bool {
	header_str(headers, HEADER_MASTER_KEY)
		.is_some_and(|key| !app.config.master_key.is_empty() && *key == *app.config.master_key)
}

pub fn parse_query_string(query: Option<&str>) -> HashMap<String, String> {
	query
		.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
		.unwrap_or_default()
}

impl<S> FromRequest<S> for RestRequest
where
	App: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let app = App::from_ref(state);
		let headers = req.headers();

		let info = RequestInfo {
			session_token: header_str(headers, HEADER_SESSION_TOKEN),
			installation_id: header_str(headers, HEADER_INSTALLATION_ID),
			client_sdk: header_str(headers, HEADER_CLIENT_VERSION),
		};
		let is_master = is_master_key(&app, headers);
		let query = parse_query_string(req.uri().query());

		let bytes = Bytes::from_request(req, state)
			.await
			.map_err(|_| Error::api(ErrorCode::InvalidJson, "invalid JSON"))?;
		let body = if bytes.iter().all(u8::is_ascii_whitespace) {
			Value::Object(RestObject::new())
		} else {
			serde_json::from_slice(&bytes)
				.map_err(|_| Error::api(ErrorCode::InvalidJson, "invalid JSON"))?
		};

		Ok(RestRequest { body, query, info, auth: AuthInfo { is_master } })
	}
}

// MasterAuth //
//************//
/// Requires the master key, rejecting with HTTP 403 otherwise
#[derive(Clone, Copy, Debug)]
pub struct MasterAuth;

impl<S> FromRequestParts<S> for MasterAuth
where
	App: FromRef<S>,
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		if is_master_key(&App::from_ref(state), &parts.headers) {
			Ok(MasterAuth)
		} else {
			Err(Error::Forbidden("unauthorized: master key is required".into()))
		}
	}
}


// vim: ts=4
