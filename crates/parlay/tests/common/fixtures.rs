//! Test fixtures

use async_trait::async_trait;
use serde_json::Value;

use parlay::{
	auth_provider::AuthProvider,
	error::{ClResult, Error, ErrorCode},
};

/// Auth provider accepting `{id, token}` when the token is `valid-{id}`
#[derive(Debug)]
pub struct TokenProvider {
	pub name: &'static str,
}

#[async_trait]
impl AuthProvider for TokenProvider {
	fn name(&self) -> &str {
		self.name
	}

	async fn validate_auth_data(&self, auth_data: &Value) -> ClResult<()> {
		let id = auth_data.get("id").and_then(Value::as_str).unwrap_or_default();
		let token = auth_data.get("token").and_then(Value::as_str).unwrap_or_default();
		if token == format!("valid-{}", id) {
			Ok(())
		} else {
			Err(Error::api(ErrorCode::ObjectNotFound, format!("{} auth is invalid for this user.", self.name)))
		}
	}
}

// vim: ts=4
