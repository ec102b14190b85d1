//! Query and update model understood by database adapters.
//!
//! Queries are equality constraints on (possibly dotted) field paths,
//! combined with `$or`. Updates are per-field operations.

use serde_json::{Map, Value};

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub enum Query {
	/// Every listed field must equal the given value
	Eq(Vec<(Box<str>, Value)>),
	/// At least one of the sub-queries must match
	Or(Vec<Query>),
}

impl Query {
	/// Matches every object
	pub fn all() -> Query {
		Query::Eq(Vec::new())
	}

	pub fn eq(field: &str, value: impl Into<Value>) -> Query {
		Query::Eq(vec![(field.into(), value.into())])
	}

	pub fn or(queries: Vec<Query>) -> Query {
		Query::Or(queries)
	}

	/// Adds an equality constraint. On an `$or` the constraint is added to
	/// every branch.
	pub fn and(self, field: &str, value: impl Into<Value>) -> Query {
		let value = value.into();
		match self {
			Query::Eq(mut fields) => {
				fields.push((field.into(), value));
				Query::Eq(fields)
			}
			Query::Or(branches) => {
				Query::Or(branches.into_iter().map(|q| q.and(field, value.clone())).collect())
			}
		}
	}

	pub fn matches(&self, object: &RestObject) -> bool {
		match self {
			Query::Eq(fields) => fields
				.iter()
				.all(|(path, expected)| lookup_path(object, path).is_some_and(|v| v == expected)),
			Query::Or(branches) => branches.iter().any(|q| q.matches(object)),
		}
	}

	/// Parses a REST `where` clause
	///
	/// Only equality and `$or` are supported; any other operator is rejected
	/// with `INVALID_QUERY`.
	pub fn from_json(value: &Value) -> ClResult<Query> {
		let Value::Object(obj) = value else {
			return Err(Error::api(ErrorCode::InvalidQuery, "where must be an object"));
		};

		let mut fields = Vec::new();
		let mut branches: Option<Vec<Query>> = None;
		for (key, value) in obj {
			if key == "$or" {
				let Value::Array(items) = value else {
					return Err(Error::api(ErrorCode::InvalidQuery, "bad $or format - use an array value"));
				};
				branches = Some(items.iter().map(Query::from_json).collect::<ClResult<_>>()?);
			} else if key.starts_with('$') {
				return Err(Error::api(ErrorCode::InvalidQuery, format!("bad top level key {}", key)));
			} else if is_operator_object(value) {
				return Err(Error::api(
					ErrorCode::InvalidQuery,
					format!("unsupported constraint on {}", key),
				));
			} else {
				fields.push((key.as_str().into(), value.clone()));
			}
		}

		Ok(match branches {
			None => Query::Eq(fields),
			Some(branches) => fields
				.into_iter()
				.fold(Query::Or(branches), |q, (field, value)| q.and(&field, value)),
		})
	}

	/// The REST `where` representation of this query
	pub fn to_json(&self) -> Value {
		match self {
			Query::Eq(fields) => {
				Value::Object(fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
			}
			Query::Or(branches) => {
				let mut obj = Map::new();
				obj.insert("$or".into(), Value::Array(branches.iter().map(Query::to_json).collect()));
				Value::Object(obj)
			}
		}
	}
}

fn is_operator_object(value: &Value) -> bool {
	value.as_object().is_some_and(|obj| obj.keys().any(|k| k.starts_with('$')))
}

/// Resolves a dotted path (`authData.apple.id`) inside an object
pub fn lookup_path<'a>(object: &'a RestObject, path: &str) -> Option<&'a Value> {
	let mut parts = path.split('.');
	let mut current = object.get(parts.next()?)?;
	for part in parts {
		current = current.as_object()?.get(part)?;
	}
	Some(current)
}

/// A single field update
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOp {
	Set(Value),
	Increment(i64),
	Unset,
}

impl UpdateOp {
	/// Parses a REST field value, honoring `{"__op": "Delete"}` and
	/// `{"__op": "Increment", "amount": n}`
	pub fn from_json(value: Value) -> ClResult<UpdateOp> {
		let Some(op) = value.get("__op").and_then(Value::as_str) else {
			return Ok(UpdateOp::Set(value));
		};
		match op {
			"Delete" => Ok(UpdateOp::Unset),
			"Increment" => {
				let amount = value.get("amount").and_then(Value::as_i64).ok_or_else(|| {
					Error::api(ErrorCode::InvalidJson, "incrementing must provide a number")
				})?;
				Ok(UpdateOp::Increment(amount))
			}
			_ => Err(Error::api(ErrorCode::InvalidJson, format!("unsupported op: {}", op))),
		}
	}

	/// Applies the operation to a field of an object
	///
	/// An increment that would overflow leaves the object unchanged.
	pub fn apply(&self, object: &mut RestObject, field: &str) -> ClResult<()> {
		match self {
			UpdateOp::Set(value) => {
				object.insert(field.to_string(), value.clone());
			}
			UpdateOp::Unset => {
				object.remove(field);
			}
			UpdateOp::Increment(amount) => {
				let current = object.get(field).and_then(Value::as_i64).unwrap_or(0);
				let sum = current.checked_add(*amount).ok_or_else(|| {
					Error::api(ErrorCode::InvalidJson, "incrementing must provide a number")
				})?;
				object.insert(field.to_string(), Value::from(sum));
			}
		}
		Ok(())
	}
}

pub type Update = Vec<(Box<str>, UpdateOp)>;


// vim: ts=4
