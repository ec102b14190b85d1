//! Third-party login providers (`authData` validation).

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait AuthProvider: Debug + Send + Sync {
	/// The `authData` key this provider is registered under (e.g. `"apple"`)
	fn name(&self) -> &str;

	/// Checks the provider-specific `authData` against the provider
	///
	/// Failures are reported as `OBJECT_NOT_FOUND` errors with a message the
	/// client can show.
	async fn validate_auth_data(&self, auth_data: &Value) -> ClResult<()>;

	/// Checks that the client application is allowed to use this provider
	async fn validate_app_id(&self, _auth_data: &Value) -> ClResult<()> {
		Ok(())
	}
}

/// Returns the `id` of a provider's `authData` as a string
pub fn auth_data_id(auth_data: &Value) -> Option<String> {
	auth_data.get("id").and_then(crate::types::id_string)
}

// vim: ts=4
