//! App builder - constructs and runs the Parlay application

use axum::Router;
use std::{collections::HashMap, sync::Arc};

use crate::auth_provider::AuthProvider;
use crate::config::ServerConfig;
use crate::database_adapter::DatabaseAdapter;
use crate::email_adapter::EmailAdapter;
use crate::files_adapter::FilesAdapter;
use crate::prelude::*;
use crate::routes;
pub use parlay_core::app::{App, AppState, VERSION};
use parlay_types::worker;

/// Adapters the application is built from
#[derive(Debug, Default)]
struct Adapters {
	database: Option<Arc<dyn DatabaseAdapter>>,
	files_adapter: Option<Arc<dyn FilesAdapter>>,
	email_adapter: Option<Arc<dyn EmailAdapter>>,
	auth_providers: HashMap<Box<str>, Arc<dyn AuthProvider>>,
}

pub struct AppBuilder {
	config: ServerConfig,
	listen: Box<str>,
	worker: Option<Arc<worker::WorkerPool>>,
	adapters: Adapters,
}

impl AppBuilder {
	pub fn new(config: ServerConfig) -> Self {
		// A subscriber may already be installed (tests, embedding applications)
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			config,
			listen: "127.0.0.1:1337".into(),
			worker: None,
			adapters: Adapters::default(),
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.listen = listen.into();
		self
	}
	pub fn worker(&mut self, worker: Arc<worker::WorkerPool>) -> &mut Self {
		self.worker = Some(worker);
		self
	}

	// Adapters
	pub fn database_adapter(&mut self, database: Arc<dyn DatabaseAdapter>) -> &mut Self {
		self.adapters.database = Some(database);
		self
	}
	pub fn files_adapter(&mut self, files_adapter: Arc<dyn FilesAdapter>) -> &mut Self {
		self.adapters.files_adapter = Some(files_adapter);
		self
	}
	pub fn email_adapter(&mut self, email_adapter: Arc<dyn EmailAdapter>) -> &mut Self {
		self.adapters.email_adapter = Some(email_adapter);
		self
	}
	/// Registers an auth provider under its `authData` key
	pub fn auth_provider(&mut self, provider: Arc<dyn AuthProvider>) -> &mut Self {
		self.adapters.auth_providers.insert(provider.name().into(), provider);
		self
	}

	/// Validates the configuration and assembles the application state
	pub fn build(self) -> ClResult<App> {
		self.config.validate().inspect_err(|e| error!("FATAL: Invalid configuration: {}", e))?;

		let Some(database) = self.adapters.database else {
			error!("FATAL: No database adapter configured");
			return Err(Error::ConfigError("No database adapter configured".to_string()));
		};
		let Some(files_adapter) = self.adapters.files_adapter else {
			error!("FATAL: No files adapter configured");
			return Err(Error::ConfigError("No files adapter configured".to_string()));
		};
		if self.config.verify_user_emails {
			self.config
				.validate_email_configuration(self.adapters.email_adapter.is_some())
				.inspect_err(|e| error!("FATAL: Invalid email configuration: {}", e))?;
		}
		let worker = self.worker.unwrap_or_else(|| Arc::new(worker::WorkerPool::new(2)));

		info!(
			"Auth providers: {}",
			self.adapters.auth_providers.keys().map(AsRef::as_ref).collect::<Vec<&str>>().join(", ")
		);

		Ok(Arc::new(AppState {
			config: self.config,
			worker,
			database,
			files_adapter,
			email_adapter: self.adapters.email_adapter,
			auth_providers: self.adapters.auth_providers,
		}))
	}

	/// Builds the application and returns its HTTP router
	pub fn build_router(self) -> ClResult<(App, Router)> {
		let app = self.build()?;
		let router = routes::init(app.clone());
		Ok((app, router))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("Parlay V{}", VERSION);

		let listen = self.listen.clone();
		let (app, router) = self.build_router()?;

		let listener = tokio::net::TcpListener::bind(listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", listen, e);
			e
		})?;
		info!("Listening on http://{}{}", listen, app.config.mount_path);

		axum::serve(listener, router).await?;
		Ok(())
	}
}

// vim: ts=4
