//! Common types used throughout the Parlay server.
//!
//! Stored objects are kept in their REST (JSON) form. Dates and pointers use
//! the Parse wire encoding (`{"__type": "Date", "iso": ...}`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

/// A stored object in REST format
pub type RestObject = Map<String, Value>;

pub const USER_CLASS: &str = "_User";
pub const SESSION_CLASS: &str = "_Session";

// Dates //
//*******//
pub fn iso_date(date: DateTime<Utc>) -> String {
	date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Encodes a date the way it is stored inside objects
pub fn encode_date(date: DateTime<Utc>) -> Value {
	json!({ "__type": "Date", "iso": iso_date(date) })
}

/// Decodes an encoded date or a plain ISO string
pub fn decode_date(value: &Value) -> Option<DateTime<Utc>> {
	let iso = match value {
		Value::String(s) => s.as_str(),
		Value::Object(obj) if obj.get("__type").and_then(Value::as_str) == Some("Date") => {
			obj.get("iso")?.as_str()?
		}
		_ => return None,
	};
	DateTime::parse_from_rfc3339(iso).ok().map(|d| d.with_timezone(&Utc))
}

// Pointers //
//**********//
pub fn pointer(class_name: &str, object_id: &str) -> Value {
	json!({ "__type": "Pointer", "className": class_name, "objectId": object_id })
}

/// Returns the object id of a pointer to `class_name`
pub fn pointer_id<'a>(value: &'a Value, class_name: &str) -> Option<&'a str> {
	let obj = value.as_object()?;
	if obj.get("__type").and_then(Value::as_str) != Some("Pointer")
		|| obj.get("className").and_then(Value::as_str) != Some(class_name)
	{
		return None;
	}
	obj.get("objectId").and_then(Value::as_str)
}

/// JavaScript truthiness of a JSON value
///
/// Client payloads are checked with the same loose rules the SDKs expect:
/// `null`, `false`, `0`, and `""` are all "missing".
pub fn is_truthy(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => false,
		Some(Value::Bool(b)) => *b,
		Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Some(Value::String(s)) => !s.is_empty(),
		Some(Value::Array(_) | Value::Object(_)) => true,
	}
}

/// Loose equality of ids (`"42" == 42`)
pub fn id_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_date_encoding() {
		let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).single().unwrap_or_default();
		let encoded = encode_date(date);
		assert_eq!(encoded["iso"], "2024-03-01T12:30:00.000Z");
		assert_eq!(decode_date(&encoded), Some(date));
		assert_eq!(decode_date(&json!("2024-03-01T12:30:00.000Z")), Some(date));
		assert_eq!(decode_date(&json!({ "__type": "File", "iso": "x" })), None);
	}

	#[test]
	fn test_truthiness() {
		assert!(!is_truthy(None));
		assert!(!is_truthy(Some(&json!(""))));
		assert!(!is_truthy(Some(&json!(0))));
		assert!(!is_truthy(Some(&Value::Null)));
		assert!(is_truthy(Some(&json!("a"))));
		assert!(is_truthy(Some(&json!(12))));
		assert!(is_truthy(Some(&json!({}))));
	}

	#[test]
	fn test_pointer_id() {
		let p = pointer(USER_CLASS, "abc");
		assert_eq!(pointer_id(&p, USER_CLASS), Some("abc"));
		assert_eq!(pointer_id(&p, SESSION_CLASS), None);
	}
}

// vim: ts=4
