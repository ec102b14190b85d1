//! Adapter that delivers account emails (verification and password reset).

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

/// Everything an email adapter needs to render one message
#[derive(Clone, Debug)]
pub struct EmailMessage {
	pub app_name: Box<str>,
	/// Link the recipient has to follow
	pub link: String,
	/// The user record with hidden fields removed
	pub user: RestObject,
}

#[async_trait]
pub trait EmailAdapter: Debug + Send + Sync {
	async fn send_verification_email(&self, message: EmailMessage) -> ClResult<()>;

	async fn send_password_reset_email(&self, message: EmailMessage) -> ClResult<()>;
}

// vim: ts=4
