//! Generic class CRUD with REST semantics
//!
//! Assigns object ids and timestamps, applies `__op` field operations, and
//! reports missing objects as `OBJECT_NOT_FOUND`. Routers compose this
//! capability and add their class-specific rules around it.

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::{fmt::Debug, sync::{Arc, LazyLock}};

use crate::prelude::*;
use parlay_types::{
	database_adapter::{DatabaseAdapter, FindOptions},
	query::{Query, Update, UpdateOp},
	types::iso_date,
	utils,
};

static FIELD_NAME: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new("^[A-Za-z][0-9A-Za-z_]*$"));

/// Fields managed by the server that clients never write directly
const RESERVED_FIELDS: [&str; 3] = ["objectId", "createdAt", "updatedAt"];

/// Whether `name` is a valid client-visible field name
pub fn is_valid_field_name(name: &str) -> bool {
	match &*FIELD_NAME {
		Ok(re) => re.is_match(name),
		Err(_) => false,
	}
}

/// Removes every key that is not a valid client-visible field name,
/// keeping `__type`
pub fn remove_hidden_properties(object: &mut RestObject) {
	object.retain(|key, _| key == "__type" || is_valid_field_name(key));
}

/// Rejects client payloads with invalid field names
pub fn validate_field_names(object: &RestObject) -> ClResult<()> {
	for key in object.keys() {
		if !is_valid_field_name(key) {
			return Err(Error::api(ErrorCode::InvalidKeyName, format!("Invalid field name: {}.", key)));
		}
	}
	Ok(())
}

/// Rejects constraints on fields clients cannot see
///
/// Dotted paths (`authData.apple.id`) are checked by their top-level field.
pub fn validate_query_keys(query: &Query) -> ClResult<()> {
	match query {
		Query::Eq(fields) => {
			for (path, _) in fields {
				let field = path.split('.').next().unwrap_or_default();
				if !is_valid_field_name(field) {
					return Err(Error::api(
						ErrorCode::InvalidKeyName,
						format!("Invalid key name: {}", path),
					));
				}
			}
			Ok(())
		}
		Query::Or(branches) => branches.iter().try_for_each(validate_query_keys),
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult {
	pub object_id: String,
	pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
	pub updated_at: String,
}

fn object_not_found() -> Error {
	Error::api(ErrorCode::ObjectNotFound, "Object not found.")
}

#[async_trait]
pub trait ClassCrud: Debug + Send + Sync {
	async fn find(
		&self,
		class_name: &str,
		query: &Query,
		opts: &FindOptions,
	) -> ClResult<Vec<RestObject>>;

	async fn get(&self, class_name: &str, object_id: &str) -> ClResult<RestObject>;

	/// Stores a new object. Server-managed fields in `object` are replaced.
	async fn create(&self, class_name: &str, object: RestObject) -> ClResult<CreateResult>;

	/// Applies a REST update body (plain values or `__op` operations)
	async fn update(
		&self,
		class_name: &str,
		object_id: &str,
		body: RestObject,
	) -> ClResult<UpdateResult>;

	async fn delete(&self, class_name: &str, object_id: &str) -> ClResult<()>;
}

/// `ClassCrud` backed directly by the database adapter
#[derive(Debug)]
pub struct DatabaseCrud {
	database: Arc<dyn DatabaseAdapter>,
}

impl DatabaseCrud {
	pub fn new(database: Arc<dyn DatabaseAdapter>) -> Self {
		Self { database }
	}
}

#[async_trait]
impl ClassCrud for DatabaseCrud {
	async fn find(
		&self,
		class_name: &str,
		query: &Query,
		opts: &FindOptions,
	) -> ClResult<Vec<RestObject>> {
		self.database.find(class_name, query, opts).await
	}

	async fn get(&self, class_name: &str, object_id: &str) -> ClResult<RestObject> {
		self.database
			.find_one(class_name, &Query::eq("objectId", object_id))
			.await?
			.ok_or_else(object_not_found)
	}

	async fn create(&self, class_name: &str, mut object: RestObject) -> ClResult<CreateResult> {
		let object_id = utils::new_object_id();
		let created_at = iso_date(Utc::now());

		object.retain(|k, v| !RESERVED_FIELDS.contains(&k.as_str()) && !v.is_null());
		object.insert("objectId".into(), object_id.clone().into());
		object.insert("createdAt".into(), created_at.clone().into());
		object.insert("updatedAt".into(), created_at.clone().into());

		debug!("create {} {}", class_name, object_id);
		self.database.create(class_name, object).await?;
		Ok(CreateResult { object_id, created_at })
	}

	async fn update(
		&self,
		class_name: &str,
		object_id: &str,
		body: RestObject,
	) -> ClResult<UpdateResult> {
		let updated_at = iso_date(Utc::now());

		let mut update: Update = Vec::with_capacity(body.len() + 1);
		for (key, value) in body {
			if RESERVED_FIELDS.contains(&key.as_str()) {
				continue;
			}
			update.push((key.into(), UpdateOp::from_json(value)?));
		}
		update.push(("updatedAt".into(), UpdateOp::Set(Value::from(updated_at.clone()))));

		let count =
			self.database.update(class_name, &Query::eq("objectId", object_id), &update).await?;
		if count == 0 {
			return Err(object_not_found());
		}
		Ok(UpdateResult { updated_at })
	}

	async fn delete(&self, class_name: &str, object_id: &str) -> ClResult<()> {
		let count = self.database.delete(class_name, &Query::eq("objectId", object_id)).await?;
		if count == 0 {
			return Err(object_not_found());
		}
		Ok(())
	}
}


// vim: ts=4
