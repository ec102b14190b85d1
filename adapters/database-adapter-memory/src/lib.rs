//! In-memory database adapter.
//!
//! Objects live in per-class vectors in insertion order. Only equality and
//! `$or` queries are supported, which is all the server itself issues.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use parlay::{
	database_adapter::{DatabaseAdapter, FindOptions},
	prelude::*,
	query::{Query, UpdateOp},
};

#[derive(Debug, Default)]
pub struct DatabaseAdapterMemory {
	classes: RwLock<HashMap<Box<str>, Vec<RestObject>>>,
}

impl DatabaseAdapterMemory {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl DatabaseAdapter for DatabaseAdapterMemory {
	async fn find(
		&self,
		class_name: &str,
		query: &Query,
		opts: &FindOptions,
	) -> ClResult<Vec<RestObject>> {
		let classes = self.classes.read();
		let Some(objects) = classes.get(class_name) else {
			return Ok(Vec::new());
		};
		let matching = objects.iter().filter(|obj| query.matches(obj)).skip(opts.skip);
		Ok(match opts.limit {
			Some(limit) => matching.take(limit).cloned().collect(),
			None => matching.cloned().collect(),
		})
	}

	async fn create(&self, class_name: &str, object: RestObject) -> ClResult<()> {
		let mut classes = self.classes.write();
		let objects = classes.entry(class_name.into()).or_default();

		let id = object.get("objectId");
		if id.is_none() {
			return Err(Error::Internal("object without objectId".into()));
		}
		if objects.iter().any(|obj| obj.get("objectId") == id) {
			return Err(Error::api(ErrorCode::OtherCause, "A duplicate value for a field with unique values was provided"));
		}
		objects.push(object);
		Ok(())
	}

	async fn update(
		&self,
		class_name: &str,
		query: &Query,
		update: &[(Box<str>, UpdateOp)],
	) -> ClResult<u64> {
		let mut classes = self.classes.write();
		let Some(objects) = classes.get_mut(class_name) else {
			return Ok(0);
		};

		// Updated copies are stored only once every object took the update
		let mut updated = Vec::new();
		for (idx, obj) in objects.iter().enumerate().filter(|(_, obj)| query.matches(obj)) {
			let mut obj = obj.clone();
			for (field, op) in update {
				op.apply(&mut obj, field)?;
			}
			updated.push((idx, obj));
		}

		let count = updated.len() as u64;
		for (idx, obj) in updated {
			objects[idx] = obj;
		}
		Ok(count)
	}

	async fn delete(&self, class_name: &str, query: &Query) -> ClResult<u64> {
		let mut classes = self.classes.write();
		let Some(objects) = classes.get_mut(class_name) else {
			return Ok(0);
		};

		let before = objects.len();
		objects.retain(|obj| !query.matches(obj));
		Ok((before - objects.len()) as u64)
	}
}


// vim: ts=4
