//! Database URI parsing

use percent_encoding::percent_decode_str;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::collections::BTreeMap;
use url::Url;

use parlay::prelude::*;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Connection options decoded from a database URI
///
/// Recognized query parameters: `ssl`, `binary`, `client_encoding`,
/// `application_name`, `fallback_application_name` and `poolSize`. Others
/// are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseOptions {
	pub host: String,
	pub port: u16,
	pub database: Option<String>,
	pub user: String,
	pub password: String,
	pub ssl: bool,
	/// Binary result transfer. `sqlx` always uses the binary protocol.
	pub binary: bool,
	pub client_encoding: Option<String>,
	pub application_name: Option<String>,
	pub fallback_application_name: Option<String>,
	pub pool_size: Option<u32>,
}

fn decode(s: &str) -> String {
	percent_decode_str(s).decode_utf8_lossy().into_owned()
}

fn is_true(value: Option<&String>) -> bool {
	value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Leading decimal digits of `s`, or the default pool size when there are
/// none or they are zero
fn parse_pool_size(s: &str) -> u32 {
	let s = s.trim_start();
	let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
	match s[..end].parse::<u32>() {
		Ok(n) if n > 0 => n,
		_ => DEFAULT_POOL_SIZE,
	}
}

/// Splits a `key=value&key=value` query string
///
/// Keys and values are percent-decoded, `+` is kept as is. A key without
/// `=` maps to an empty value. Only the first `=` separates key and value.
pub fn parse_query_params(query: &str) -> BTreeMap<String, String> {
	query
		.split('&')
		.filter(|pair| !pair.is_empty())
		.map(|pair| match pair.split_once('=') {
			Some((key, value)) => (decode(key), decode(value)),
			None => (decode(pair), String::new()),
		})
		.collect()
}

pub fn get_database_options_from_uri(uri: &str) -> ClResult<DatabaseOptions> {
	let url = Url::parse(uri)
		.map_err(|err| Error::ConfigError(format!("invalid database URI: {}", err)))?;
	let params = parse_query_params(url.query().unwrap_or_default());

	let database = url.path().strip_prefix('/').filter(|db| !db.is_empty()).map(decode);

	Ok(DatabaseOptions {
		host: url.host_str().filter(|h| !h.is_empty()).unwrap_or(DEFAULT_HOST).to_string(),
		port: url.port().unwrap_or(DEFAULT_PORT),
		database,
		user: decode(url.username()),
		password: url.password().map(decode).unwrap_or_default(),
		ssl: is_true(params.get("ssl")),
		binary: is_true(params.get("binary")),
		client_encoding: params.get("client_encoding").cloned(),
		application_name: params.get("application_name").cloned(),
		fallback_application_name: params.get("fallback_application_name").cloned(),
		pool_size: params.get("poolSize").filter(|s| !s.is_empty()).map(|s| parse_pool_size(s)),
	})
}

impl DatabaseOptions {
	pub fn max_connections(&self) -> u32 {
		self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
	}

	pub fn connect_options(&self) -> PgConnectOptions {
		let mut opts = PgConnectOptions::new()
			.host(&self.host)
			.port(self.port)
			.username(&self.user)
			.ssl_mode(if self.ssl { PgSslMode::Require } else { PgSslMode::Disable });
		if !self.password.is_empty() {
			opts = opts.password(&self.password);
		}
		if let Some(database) = &self.database {
			opts = opts.database(database);
		}
		if let Some(name) =
			self.application_name.as_ref().or(self.fallback_application_name.as_ref())
		{
			opts = opts.application_name(name);
		}
		if let Some(encoding) = &self.client_encoding {
			opts = opts.options([("client_encoding", encoding.as_str())]);
		}
		opts
	}

	pub fn pool_options(&self) -> PgPoolOptions {
		PgPoolOptions::new().max_connections(self.max_connections())
	}
}


// vim: ts=4
