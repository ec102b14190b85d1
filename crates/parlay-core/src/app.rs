//! App state type

use std::{collections::HashMap, sync::Arc};

use crate::config::ServerConfig;
use crate::prelude::*;

use parlay_types::auth_provider::AuthProvider;
use parlay_types::database_adapter::DatabaseAdapter;
use parlay_types::email_adapter::EmailAdapter;
use parlay_types::files_adapter::{FilesAdapter, FilesConfig};
use parlay_types::worker;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
pub struct AppState {
	pub config: ServerConfig,
	pub worker: Arc<worker::WorkerPool>,

	pub database: Arc<dyn DatabaseAdapter>,
	pub files_adapter: Arc<dyn FilesAdapter>,
	pub email_adapter: Option<Arc<dyn EmailAdapter>>,
	pub auth_providers: HashMap<Box<str>, Arc<dyn AuthProvider>>,
}

impl AppState {
	/// Returns the auth provider registered under `name`
	pub fn auth_provider(&self, name: &str) -> ClResult<&Arc<dyn AuthProvider>> {
		self.auth_providers.get(name).ok_or_else(|| {
			Error::api(ErrorCode::UnsupportedService, "This authentication method is unsupported.")
		})
	}

	/// Settings the files adapter needs to compute file locations
	pub fn files_config(&self) -> FilesConfig {
		FilesConfig {
			mount: self.config.mount.clone(),
			application_id: self.config.application_id.clone(),
			file_key: self.config.file_key.clone(),
		}
	}
}

pub type App = Arc<AppState>;

// vim: ts=4
