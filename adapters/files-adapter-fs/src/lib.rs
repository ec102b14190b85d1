//! Filesystem files adapter. Files are stored flat under a base directory,
//! one file per name.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{
	fs::{File, create_dir_all, remove_file, rename},
	io::{AsyncReadExt, AsyncWriteExt},
};
use tokio_util::io::ReaderStream;

use parlay::{
	files_adapter::{FileStream, FilesAdapter, FilesConfig},
	prelude::*,
	utils,
};

/// Path of a stored file
///
/// Names that could escape the base directory are rejected.
fn file_path(base_dir: &Path, filename: &str) -> ClResult<PathBuf> {
	if filename.is_empty()
		|| filename.starts_with('.')
		|| filename.contains(['/', '\\', '\0'])
	{
		return Err(Error::api(ErrorCode::InvalidFileName, "Filename contains invalid characters."));
	}
	Ok(base_dir.join(filename))
}

fn tmp_file_path(base_dir: &Path) -> PathBuf {
	base_dir.join(format!(".tmp-{}", utils::random_hex_string(16)))
}

#[derive(Debug)]
pub struct FilesAdapterFs {
	base_dir: Box<Path>,
}

impl FilesAdapterFs {
	pub async fn new(base_dir: Box<Path>) -> ClResult<Self> {
		create_dir_all(&base_dir).await?;
		Ok(Self { base_dir })
	}
}

#[async_trait]
impl FilesAdapter for FilesAdapterFs {
	/// Writes to a temporary file first, then renames it into place
	async fn create_file(
		&self,
		filename: &str,
		data: &[u8],
		_content_type: Option<&str>,
	) -> ClResult<()> {
		let path = file_path(&self.base_dir, filename)?;
		let tmp_path = tmp_file_path(&self.base_dir);
		info!("create_file: {:?}", path);

		let res = async {
			let mut file = File::create(&tmp_path).await?;
			file.write_all(data).await?;
			file.sync_all().await?;
			rename(&tmp_path, &path).await?;
			Ok::<(), Error>(())
		}
		.await;
		if let Err(err) = res {
			warn!("create_file failed, removing tmpfile {:?}: {}", tmp_path, err);
			let _ = remove_file(&tmp_path).await;
			return Err(err);
		}

		Ok(())
	}

	async fn delete_file(&self, filename: &str) -> ClResult<()> {
		remove_file(file_path(&self.base_dir, filename)?).await.map_err(|err| match err.kind() {
			std::io::ErrorKind::NotFound => Error::NotFound,
			_ => Error::Io(err),
		})
	}

	async fn get_file_data(&self, filename: &str) -> ClResult<Box<[u8]>> {
		let mut file =
			File::open(file_path(&self.base_dir, filename)?).await.map_err(|_| Error::NotFound)?;
		let mut buf: Vec<u8> = Vec::new();
		file.read_to_end(&mut buf).await?;

		Ok(buf.into_boxed_slice())
	}

	async fn get_file_stream(&self, filename: &str) -> ClResult<FileStream> {
		let file =
			File::open(file_path(&self.base_dir, filename)?).await.map_err(|_| Error::NotFound)?;
		Ok(Box::pin(ReaderStream::new(file)))
	}

	fn get_file_location(&self, config: &FilesConfig, filename: &str) -> String {
		format!(
			"{}/files/{}/{}",
			config.mount,
			config.application_id,
			utils::encode_uri_component(filename)
		)
	}
}


// vim: ts=4
