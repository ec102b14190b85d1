//! Password hashing. bcrypt runs on the worker pool, never on the runtime.

use crate::prelude::*;
use parlay_types::worker;

fn hash_password_sync(password: Box<str>, cost: u32) -> ClResult<Box<str>> {
	let hash = bcrypt::hash(password.as_ref(), cost)
		.map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;

	Ok(hash.into())
}

pub async fn hash_password(
	worker: &worker::WorkerPool,
	password: Box<str>,
	cost: u32,
) -> ClResult<Box<str>> {
	worker.try_run(move || hash_password_sync(password, cost)).await
}

/// Compares a plaintext password with a stored hash
///
/// A malformed stored hash compares as a mismatch.
pub async fn compare_password(
	worker: &worker::WorkerPool,
	password: Box<str>,
	password_hash: Box<str>,
) -> ClResult<bool> {
	worker
		.run(move || bcrypt::verify(password.as_ref(), &password_hash).unwrap_or(false))
		.await
}


// vim: ts=4
