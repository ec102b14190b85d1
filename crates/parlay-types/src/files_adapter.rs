//! Adapter that stores uploaded files.

use async_trait::async_trait;
use futures_core::Stream;
use serde::Serialize;
use std::{fmt::Debug, pin::Pin};

use crate::prelude::*;

pub type FileStream = Pin<Box<dyn Stream<Item = Result<axum::body::Bytes, std::io::Error>> + Send>>;

/// Server settings a files adapter needs to compute public locations
#[derive(Clone, Debug)]
pub struct FilesConfig {
	/// Public URL of the API mount (e.g. `https://example.com/parse`)
	pub mount: Box<str>,
	pub application_id: Box<str>,
	pub file_key: Option<Box<str>>,
}

/// A stored file as reported to clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileInfo {
	pub url: String,
	pub name: String,
}

#[async_trait]
pub trait FilesAdapter: Debug + Send + Sync {
	async fn create_file(
		&self,
		filename: &str,
		data: &[u8],
		content_type: Option<&str>,
	) -> ClResult<()>;

	async fn delete_file(&self, filename: &str) -> ClResult<()>;

	async fn get_file_data(&self, filename: &str) -> ClResult<Box<[u8]>>;

	/// Streams the content of a file
	///
	/// The default implementation reads the whole file first.
	async fn get_file_stream(&self, filename: &str) -> ClResult<FileStream> {
		let data = self.get_file_data(filename).await?;
		let chunk: Result<axum::body::Bytes, std::io::Error> = Ok(axum::body::Bytes::from(data));
		Ok(Box::pin(futures::stream::iter([chunk])))
	}

	/// Public URL of a stored file
	fn get_file_location(&self, config: &FilesConfig, filename: &str) -> String;
}

// vim: ts=4
