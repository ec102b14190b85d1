//! Development server: in-memory database, files on disk, emails logged.
//!
//! Configured from `PARLAY_*` environment variables.

use async_trait::async_trait;
use std::{env, path::PathBuf, sync::Arc};
use tracing::info;

use parlay::{
	AppBuilder,
	config::{AccountLockoutPolicy, ServerConfig},
	email_adapter::{EmailAdapter, EmailMessage},
	error::{ClResult, Error},
};
use parlay_auth_adapter_social::{AppleOptions, AppleProvider, LinkedInOptions, LinkedInProvider};
use parlay_database_adapter_memory::DatabaseAdapterMemory;
use parlay_files_adapter_fs::FilesAdapterFs;

/// Prints account emails instead of sending them
#[derive(Debug)]
struct LogEmailAdapter;

#[async_trait]
impl EmailAdapter for LogEmailAdapter {
	async fn send_verification_email(&self, message: EmailMessage) -> ClResult<()> {
		info!("[{}] verify email: {}", message.app_name, message.link);
		Ok(())
	}

	async fn send_password_reset_email(&self, message: EmailMessage) -> ClResult<()> {
		info!("[{}] password reset: {}", message.app_name, message.link);
		Ok(())
	}
}

fn var(name: &str) -> Option<String> {
	env::var(name).ok().filter(|v| !v.is_empty())
}

fn flag(name: &str) -> bool {
	var(name).is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn number<T: std::str::FromStr>(name: &str) -> ClResult<Option<T>> {
	var(name)
		.map(|v| v.parse().map_err(|_| Error::ConfigError(format!("{} must be a number", name))))
		.transpose()
}

fn list(name: &str) -> Vec<String> {
	var(name)
		.map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
		.unwrap_or_default()
}

fn server_config() -> ClResult<ServerConfig> {
	let app_id = var("PARLAY_APP_ID").unwrap_or_else(|| "parlay".into());
	let master_key = var("PARLAY_MASTER_KEY")
		.ok_or_else(|| Error::ConfigError("PARLAY_MASTER_KEY is required".into()))?;
	let mount = var("PARLAY_SERVER_URL").unwrap_or_else(|| "http://localhost:1337/parse".into());

	let mut config = ServerConfig::new(&app_id, &master_key, &mount);
	if let Some(mount_path) = var("PARLAY_MOUNT_PATH") {
		config.mount_path = mount_path.into();
	}
	config.app_name = var("PARLAY_APP_NAME").map(Into::into);
	config.public_server_url =
		var("PARLAY_PUBLIC_SERVER_URL").or_else(|| Some(mount.clone())).map(Into::into);
	config.verify_user_emails = flag("PARLAY_VERIFY_USER_EMAILS");
	config.prevent_login_with_unverified_email = flag("PARLAY_PREVENT_LOGIN_WITH_UNVERIFIED_EMAIL");
	config.preserve_file_name = flag("PARLAY_PRESERVE_FILE_NAME");
	if let Some(threshold) = number("PARLAY_ACCOUNT_LOCKOUT_THRESHOLD")? {
		let duration = number("PARLAY_ACCOUNT_LOCKOUT_DURATION")?.unwrap_or(5);
		config.account_lockout = Some(AccountLockoutPolicy { duration, threshold });
	}
	if let Some(cost) = number("PARLAY_BCRYPT_COST")? {
		config.bcrypt_cost = cost;
	}

	Ok(config)
}

#[tokio::main]
async fn main() -> ClResult<()> {
	let config = server_config()?;
	let files_dir = PathBuf::from(var("PARLAY_FILES_DIR").unwrap_or_else(|| "./data/files".into()));

	let mut builder = AppBuilder::new(config);
	builder
		.database_adapter(Arc::new(DatabaseAdapterMemory::new()))
		.files_adapter(Arc::new(FilesAdapterFs::new(files_dir.into()).await?))
		.email_adapter(Arc::new(LogEmailAdapter));
	if let Some(listen) = var("PARLAY_LISTEN") {
		builder.listen(listen);
	}

	let apple_client_ids = list("PARLAY_APPLE_CLIENT_IDS");
	if !apple_client_ids.is_empty() {
		builder.auth_provider(Arc::new(AppleProvider::new(AppleOptions {
			client_ids: apple_client_ids,
			..Default::default()
		})));
	}
	if flag("PARLAY_LINKEDIN") {
		builder.auth_provider(Arc::new(LinkedInProvider::new(LinkedInOptions::default())));
	}

	builder.run().await
}

// vim: ts=4
