//! Common test utilities and helpers
//!
//! Builds a full application on the in-memory database and a temporary
//! filesystem files adapter, and sends requests through the router.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum::{
	Router,
	body::Body,
	http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use parlay::{
	App, AppBuilder,
	auth_provider::AuthProvider,
	config::ServerConfig,
	email_adapter::{EmailAdapter, EmailMessage},
	error::ClResult,
	worker::WorkerPool,
};
use parlay_database_adapter_memory::DatabaseAdapterMemory;
use parlay_files_adapter_fs::FilesAdapterFs;

pub const APP_ID: &str = "test-app";
pub const MASTER_KEY: &str = "test-master";
pub const MOUNT: &str = "http://localhost:1337/parse";

/// Email adapter keeping every message it is asked to send
#[derive(Debug, Default)]
pub struct RecordingEmail {
	pub sent: Mutex<Vec<(&'static str, EmailMessage)>>,
}

impl RecordingEmail {
	pub fn count(&self, kind: &str) -> usize {
		self.sent.lock().iter().filter(|(k, _)| *k == kind).count()
	}

	pub fn last_link(&self, kind: &str) -> Option<String> {
		self.sent.lock().iter().rev().find(|(k, _)| *k == kind).map(|(_, m)| m.link.clone())
	}
}

#[async_trait]
impl EmailAdapter for RecordingEmail {
	async fn send_verification_email(&self, message: EmailMessage) -> ClResult<()> {
		self.sent.lock().push(("verify", message));
		Ok(())
	}
	async fn send_password_reset_email(&self, message: EmailMessage) -> ClResult<()> {
		self.sent.lock().push(("reset", message));
		Ok(())
	}
}

pub fn test_config() -> ServerConfig {
	let mut config = ServerConfig::new(APP_ID, MASTER_KEY, MOUNT);
	config.app_name = Some("Test App".into());
	config.public_server_url = Some(MOUNT.into());
	config.bcrypt_cost = 4;
	config
}

pub struct TestServer {
	pub app: App,
	pub router: Router,
	pub email: Arc<RecordingEmail>,
	_files_dir: TempDir,
}

impl TestServer {
	pub async fn new() -> Self {
		Self::with_config(test_config(), Vec::new()).await
	}

	pub async fn with_config(config: ServerConfig, providers: Vec<Arc<dyn AuthProvider>>) -> Self {
		let files_dir = TempDir::new().expect("Failed to create temp directory");
		let files_adapter =
			FilesAdapterFs::new(files_dir.path().into()).await.expect("Failed to create adapter");
		let email = Arc::new(RecordingEmail::default());

		let mut builder = AppBuilder::new(config);
		builder
			.worker(Arc::new(WorkerPool::new(1)))
			.database_adapter(Arc::new(DatabaseAdapterMemory::new()))
			.files_adapter(Arc::new(files_adapter))
			.email_adapter(email.clone());
		for provider in providers {
			builder.auth_provider(provider);
		}
		let (app, router) = builder.build_router().expect("Failed to build app");

		Self { app, router, email, _files_dir: files_dir }
	}

	/// Sends a raw request through the router
	pub async fn send(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
		let res = self.router.clone().oneshot(req).await.unwrap();
		let status = res.status();
		let headers = res.headers().clone();
		let body = res.into_body().collect().await.unwrap().to_bytes().to_vec();
		(status, headers, body)
	}

	/// Sends a JSON request with the application id and extra headers
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		headers: &[(&str, &str)],
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let mut req = Request::builder()
			.method(method)
			.uri(format!("/parse{}", path))
			.header("x-parse-application-id", APP_ID);
		for (name, value) in headers {
			req = req.header(*name, *value);
		}
		let req = match body {
			Some(body) => req
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(body.to_string()))
				.unwrap(),
			None => req.body(Body::empty()).unwrap(),
		};

		let (status, _, body) = self.send(req).await;
		let value = serde_json::from_slice(&body)
			.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
		(status, value)
	}

	pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
		self.request(Method::GET, path, headers, None).await
	}

	pub async fn post(&self, path: &str, headers: &[(&str, &str)], body: Value) -> (StatusCode, Value) {
		self.request(Method::POST, path, headers, Some(body)).await
	}

	/// Signs up a user and returns the response body
	pub async fn signup(&self, body: Value) -> Value {
		let (status, res) = self.post("/users", &[], body).await;
		assert_eq!(status, StatusCode::CREATED, "signup failed: {}", res);
		res
	}

	/// Logs in and returns the session token
	pub async fn login(&self, username: &str, password: &str) -> String {
		let body = serde_json::json!({ "username": username, "password": password });
		let (status, res) = self.post("/login", &[], body).await;
		assert_eq!(status, StatusCode::OK, "login failed: {}", res);
		res["sessionToken"].as_str().unwrap().to_string()
	}
}

// vim: ts=4
