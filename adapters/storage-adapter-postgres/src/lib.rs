//! Postgres storage adapter configuration.
//!
//! Turns a `postgres://` database URI into connection options and a lazily
//! connecting `sqlx` pool.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod config_parser;

use sqlx::postgres::PgPool;

use parlay::prelude::*;

pub use config_parser::{DatabaseOptions, get_database_options_from_uri, parse_query_params};

/// Creates a connection pool for `uri` without connecting
///
/// Must be called inside a Tokio runtime.
pub fn create_pool(uri: &str) -> ClResult<PgPool> {
	let options = get_database_options_from_uri(uri)?;
	info!(
		"Postgres pool: {}@{}:{}/{} (max {} connections)",
		options.user,
		options.host,
		options.port,
		options.database.as_deref().unwrap_or(""),
		options.max_connections()
	);
	Ok(options.pool_options().connect_lazy_with(options.connect_options()))
}

// vim: ts=4
