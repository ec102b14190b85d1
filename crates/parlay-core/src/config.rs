//! Server configuration.
//!
//! Every option the routers and controllers understand is a field here.
//! Durations carry their unit in the field documentation.

use crate::prelude::*;

pub const DEFAULT_MOUNT_PATH: &str = "/parse";
/// One year, in seconds
pub const DEFAULT_SESSION_LENGTH: i64 = 31_536_000;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Clone, Debug, Default)]
pub struct PasswordPolicy {
	/// Days after which a password must be reset before logging in again
	pub max_password_age: Option<u32>,
	/// Seconds a password reset token stays valid
	pub reset_token_validity_duration: Option<u32>,
}

#[derive(Clone, Copy, Debug)]
pub struct AccountLockoutPolicy {
	/// Minutes an account stays locked
	pub duration: u32,
	/// Failed login attempts that trigger a lockout
	pub threshold: u32,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
	/// Value clients must send in `X-Parse-Application-Id`
	pub application_id: Box<str>,
	/// Value of `X-Parse-Master-Key` granting master access
	pub master_key: Box<str>,
	/// Public URL of the API mount (e.g. `https://example.com/parse`)
	pub mount: Box<str>,
	/// Path the HTTP routes are nested under
	pub mount_path: Box<str>,

	pub app_name: Option<Box<str>>,
	pub public_server_url: Option<Box<str>>,
	pub verify_user_emails: bool,
	pub prevent_login_with_unverified_email: bool,
	/// Seconds an email verification token stays valid
	pub email_verify_token_validity_duration: Option<u32>,

	pub password_policy: Option<PasswordPolicy>,
	pub account_lockout: Option<AccountLockoutPolicy>,
	/// Seconds a session stays valid
	pub session_length: i64,

	pub file_key: Option<Box<str>>,
	/// Store files under the client-supplied name without a random prefix
	pub preserve_file_name: bool,

	pub bcrypt_cost: u32,
}

impl ServerConfig {
	pub fn new(application_id: &str, master_key: &str, mount: &str) -> Self {
		Self {
			application_id: application_id.into(),
			master_key: master_key.into(),
			mount: mount.trim_end_matches('/').into(),
			mount_path: DEFAULT_MOUNT_PATH.into(),
			app_name: None,
			public_server_url: None,
			verify_user_emails: false,
			prevent_login_with_unverified_email: false,
			email_verify_token_validity_duration: None,
			password_policy: None,
			account_lockout: None,
			session_length: DEFAULT_SESSION_LENGTH,
			file_key: None,
			preserve_file_name: false,
			bcrypt_cost: DEFAULT_BCRYPT_COST,
		}
	}

	/// Checks option values that can be validated without the adapters
	pub fn validate(&self) -> ClResult<()> {
		if self.application_id.is_empty() {
			return Err(Error::ConfigError("applicationId is required".into()));
		}
		if self.master_key.is_empty() {
			return Err(Error::ConfigError("masterKey is required".into()));
		}

		if let Some(lockout) = &self.account_lockout {
			if lockout.duration == 0 || lockout.duration >= 100_000 {
				return Err(Error::ConfigError(
					"Account lockout duration should be greater than 0 and less than 100000".into(),
				));
			}
			if lockout.threshold == 0 || lockout.threshold >= 1000 {
				return Err(Error::ConfigError(
					"Account lockout threshold should be an integer greater than 0 and less than 1000"
						.into(),
				));
			}
		}

		if let Some(policy) = &self.password_policy {
			if policy.max_password_age == Some(0) {
				return Err(Error::ConfigError(
					"passwordPolicy.maxPasswordAge must be a positive number".into(),
				));
			}
			if policy.reset_token_validity_duration == Some(0) {
				return Err(Error::ConfigError(
					"passwordPolicy.resetTokenValidityDuration must be a positive number".into(),
				));
			}
		}

		if !(4..=31).contains(&self.bcrypt_cost) {
			return Err(Error::ConfigError("bcrypt cost must be between 4 and 31".into()));
		}

		Ok(())
	}

	/// Checks the options the password reset and email verification
	/// features depend on
	pub fn validate_email_configuration(&self, has_email_adapter: bool) -> ClResult<()> {
		if !has_email_adapter {
			return Err(Error::ConfigError("An emailAdapter is required".into()));
		}
		if self.app_name.as_deref().is_none_or(str::is_empty) {
			return Err(Error::ConfigError("An app name is required".into()));
		}
		if self.public_server_url.as_deref().is_none_or(str::is_empty) {
			return Err(Error::ConfigError("A public server url is required".into()));
		}
		if self.email_verify_token_validity_duration == Some(0) {
			return Err(Error::ConfigError(
				"Email verify token validity duration must be a value greater than 0.".into(),
			));
		}
		Ok(())
	}

	/// Max password age in days, when the password expiry policy is active
	pub fn max_password_age(&self) -> Option<u32> {
		self.password_policy.as_ref().and_then(|p| p.max_password_age)
	}
}


// vim: ts=4
