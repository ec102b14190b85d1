//! Files controller
//!
//! Delegates storage to the configured files adapter. New files get their
//! extension or content type completed and, unless names are preserved, a
//! random prefix so uploads never collide.

use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

use crate::prelude::*;
use parlay_types::{
	files_adapter::{FileInfo, FileStream, FilesAdapter, FilesConfig},
	types::is_truthy,
	utils,
};

pub const MAX_FILENAME_LENGTH: usize = 128;

static FILENAME: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"^[_a-zA-Z0-9][a-zA-Z0-9@\. ~_-]*$"));

/// Checks a client-supplied filename
pub fn validate_filename(filename: &str) -> ClResult<()> {
	if filename.len() > MAX_FILENAME_LENGTH {
		return Err(Error::api(ErrorCode::InvalidFileName, "Filename too long."));
	}
	let valid = match &*FILENAME {
		Ok(re) => re.is_match(filename),
		Err(_) => false,
	};
	if !valid {
		return Err(Error::api(ErrorCode::InvalidFileName, "Filename contains invalid characters."));
	}
	Ok(())
}

/// Extension of a filename including the dot, empty when there is none
///
/// A leading dot (`.profile`) does not start an extension.
pub fn extname(filename: &str) -> &str {
	let base = filename.rsplit('/').next().unwrap_or(filename);
	match base.rfind('.') {
		Some(idx) if idx > 0 => &base[idx..],
		_ => "",
	}
}

/// Preferred file extension for a content type
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
	let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
	if essence == "text/plain" {
		return Some("txt");
	}
	let extensions = mime_guess::get_mime_extensions_str(&essence)?;
	let subtype = essence.split('/').nth(1).unwrap_or_default();
	extensions.iter().find(|&&ext| ext == subtype).or_else(|| extensions.first()).copied()
}

/// Content type for a filename, by extension
pub fn content_type_for_filename(filename: &str) -> Option<&'static str> {
	mime_guess::from_path(filename).first_raw()
}

#[derive(Clone, Debug)]
pub struct FilesController {
	adapter: Arc<dyn FilesAdapter>,
	preserve_file_name: bool,
}

impl FilesController {
	pub fn new(adapter: Arc<dyn FilesAdapter>, preserve_file_name: bool) -> Self {
		Self { adapter, preserve_file_name }
	}

	pub fn from_app(app: &App) -> Self {
		Self::new(app.files_adapter.clone(), app.config.preserve_file_name)
	}

	/// Stores a new file and returns its public name and URL
	pub async fn create_file(
		&self,
		config: &FilesConfig,
		filename: &str,
		data: &[u8],
		content_type: Option<&str>,
	) -> ClResult<FileInfo> {
		let mut filename = filename.to_string();
		let mut content_type = content_type.map(str::to_string);

		let has_extension = !extname(&filename).is_empty();
		match (&content_type, has_extension) {
			(Some(ct), false) => {
				if let Some(ext) = extension_for_content_type(ct) {
					filename = format!("{}.{}", filename, ext);
				}
			}
			(None, true) => {
				content_type = content_type_for_filename(&filename).map(str::to_string);
			}
			_ => {}
		}

		if !self.preserve_file_name {
			filename = format!("{}_{}", utils::random_hex_string(32), filename);
		}

		let url = self.adapter.get_file_location(config, &filename);
		self.adapter.create_file(&filename, data, content_type.as_deref()).await?;
		Ok(FileInfo { url, name: filename })
	}

	pub async fn delete_file(&self, filename: &str) -> ClResult<()> {
		self.adapter.delete_file(filename).await
	}

	pub async fn get_file_data(&self, filename: &str) -> ClResult<Box<[u8]>> {
		self.adapter.get_file_data(filename).await
	}

	pub async fn get_file_stream(&self, filename: &str) -> ClResult<FileStream> {
		self.adapter.get_file_stream(filename).await
	}

	pub fn get_file_location(&self, config: &FilesConfig, filename: &str) -> String {
		self.adapter.get_file_location(config, filename)
	}

	/// Adds the `url` to every `File` field of a REST object (or of each
	/// object of an array) that does not have one yet
	///
	/// Only top-level fields are expanded.
	pub fn expand_files_in_object(&self, config: &FilesConfig, object: &mut Value) {
		match object {
			Value::Array(items) => {
				for item in items {
					self.expand_files_in_object(config, item);
				}
			}
			Value::Object(obj) => self.expand_files_in_rest_object(config, obj),
			_ => {}
		}
	}

	pub fn expand_files_in_rest_object(&self, config: &FilesConfig, object: &mut RestObject) {
		for field in object.values_mut() {
			let Value::Object(file) = field else { continue };
			if file.get("__type").and_then(Value::as_str) != Some("File") || is_truthy(file.get("url")) {
				continue;
			}
			let Some(name) = file.get("name").and_then(Value::as_str) else { continue };
			let url = self.adapter.get_file_location(config, name);
			file.insert("url".into(), url.into());
		}
	}
}


// vim: ts=4
