//! LinkedIn OAuth
//!
//! `authData.linkedin` is `{id, access_token, is_mobile_sdk?}`. The token is
//! used to fetch the profile and the profile id must match the claimed id.

use async_trait::async_trait;
use serde_json::Value;

use parlay::{auth_provider::AuthProvider, prelude::*, types::id_string};

use crate::http::HttpClient;

pub const LINKEDIN_API: &str = "https://api.linkedin.com";

#[derive(Clone, Debug, Default)]
pub struct LinkedInOptions {
	/// Overrides the API base URL
	pub api_base: Option<String>,
}

#[derive(Debug)]
pub struct LinkedInProvider {
	api_base: Box<str>,
	client: HttpClient,
}

impl LinkedInProvider {
	pub fn new(options: LinkedInOptions) -> Self {
		let api_base = options.api_base.unwrap_or_else(|| LINKEDIN_API.to_string());
		Self { api_base: api_base.trim_end_matches('/').into(), client: HttpClient::new() }
	}

	async fn request_profile(&self, access_token: &str, is_mobile_sdk: bool) -> ClResult<Value> {
		let authorization = format!("Bearer {}", access_token);
		let mut headers = vec![("authorization", authorization.as_str()), ("x-li-format", "json")];
		if is_mobile_sdk {
			headers.push(("x-li-src", "msdk"));
		}

		self.client.get_json(&format!("{}/v2/me", self.api_base), &headers).await
	}
}

#[async_trait]
impl AuthProvider for LinkedInProvider {
	fn name(&self) -> &str {
		"linkedin"
	}

	async fn validate_auth_data(&self, auth_data: &Value) -> ClResult<()> {
		let access_token = auth_data.get("access_token").and_then(Value::as_str).unwrap_or_default();
		let is_mobile_sdk = auth_data.get("is_mobile_sdk").and_then(Value::as_bool).unwrap_or(false);

		let profile = self.request_profile(access_token, is_mobile_sdk).await.map_err(|err| {
			debug!("LinkedIn profile request failed: {}", err);
			Error::api(ErrorCode::ObjectNotFound, "Failed to validate this access token with Linkedin.")
		})?;

		// Ids are compared as strings, numeric ids match their decimal form
		let profile_id = profile.get("id").and_then(id_string);
		let claimed_id = auth_data.get("id").and_then(id_string);
		match (profile_id, claimed_id) {
			(Some(profile_id), Some(claimed_id)) if profile_id == claimed_id => Ok(()),
			_ => Err(Error::api(ErrorCode::ObjectNotFound, "Linkedin auth is invalid for this user.")),
		}
	}
}

// vim: ts=4
