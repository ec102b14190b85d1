//! Minimal HTTPS JSON client shared by the providers

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use serde_json::Value;

use parlay::prelude::*;

#[derive(Clone)]
pub(crate) struct HttpClient {
	client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
}

impl std::fmt::Debug for HttpClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HttpClient").finish_non_exhaustive()
	}
}

impl HttpClient {
	pub fn new() -> Self {
		let connector = HttpsConnectorBuilder::new()
			.with_webpki_roots()
			.https_or_http()
			.enable_http1()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(connector);

		Self { client }
	}

	/// GETs a JSON document
	///
	/// Non-success statuses are reported as network errors.
	pub async fn get_json(&self, uri: &str, headers: &[(&str, &str)]) -> ClResult<Value> {
		let mut request = hyper::Request::builder().method(hyper::Method::GET).uri(uri);
		for (name, value) in headers {
			request = request.header(*name, *value);
		}
		let request = request
			.body(Empty::<Bytes>::new())
			.map_err(|e| Error::NetworkError(format!("Request build error: {}", e)))?;

		let response = self
			.client
			.request(request)
			.await
			.map_err(|e| Error::NetworkError(format!("{}: {}", uri, e)))?;
		let status = response.status();
		if !status.is_success() {
			return Err(Error::NetworkError(format!("{}: HTTP {}", uri, status)));
		}

		let body = response
			.into_body()
			.collect()
			.await
			.map_err(|e| Error::NetworkError(format!("{}: {}", uri, e)))?
			.to_bytes();
		Ok(serde_json::from_slice(&body)?)
	}
}

// vim: ts=4
