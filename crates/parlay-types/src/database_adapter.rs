//! Adapter that stores class objects (users, sessions, and application classes).
//!
//! The adapter works on REST-shaped objects. It does not interpret field
//! values besides what a `Query` compares and what an `UpdateOp` changes.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;
use crate::query::{Query, UpdateOp};

/// Paging options for `find`
#[derive(Clone, Copy, Debug, Default)]
pub struct FindOptions {
	pub limit: Option<usize>,
	pub skip: usize,
}

impl FindOptions {
	pub fn limit(limit: usize) -> Self {
		Self { limit: Some(limit), skip: 0 }
	}
}

#[async_trait]
pub trait DatabaseAdapter: Debug + Send + Sync {
	/// Returns the objects of a class matching a query, in insertion order
	async fn find(
		&self,
		class_name: &str,
		query: &Query,
		opts: &FindOptions,
	) -> ClResult<Vec<RestObject>>;

	/// Stores a new object. The object must already carry its `objectId`.
	async fn create(&self, class_name: &str, object: RestObject) -> ClResult<()>;

	/// Applies field updates to every object matching a query
	///
	/// Returns the number of updated objects.
	async fn update(
		&self,
		class_name: &str,
		query: &Query,
		update: &[(Box<str>, UpdateOp)],
	) -> ClResult<u64>;

	/// Deletes every object matching a query, returning how many were removed
	async fn delete(&self, class_name: &str, query: &Query) -> ClResult<u64>;

	/// Returns the first matching object
	async fn find_one(&self, class_name: &str, query: &Query) -> ClResult<Option<RestObject>> {
		Ok(self.find(class_name, query, &FindOptions::limit(1)).await?.into_iter().next())
	}
}

// vim: ts=4
