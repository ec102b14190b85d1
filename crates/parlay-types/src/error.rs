//! Error type shared by every Parlay crate.
//!
//! Client-facing failures carry a numeric code understood by the Parse SDKs.
//! Infrastructure failures are collapsed into `INTERNAL_SERVER_ERROR` when
//! they reach the HTTP layer.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::error;

pub type ClResult<T> = std::result::Result<T, Error>;

/// Numeric error codes as defined by the Parse REST protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
	OtherCause = -1,
	InternalServerError = 1,
	ObjectNotFound = 101,
	InvalidQuery = 102,
	InvalidKeyName = 105,
	InvalidJson = 107,
	OperationForbidden = 119,
	InvalidFileName = 122,
	InvalidEmailAddress = 125,
	FileSaveError = 130,
	FileDeleteError = 153,
	UsernameMissing = 200,
	PasswordMissing = 201,
	UsernameTaken = 202,
	EmailTaken = 203,
	EmailMissing = 204,
	EmailNotFound = 205,
	SessionMissing = 206,
	AccountAlreadyLinked = 208,
	InvalidSessionToken = 209,
	UnsupportedService = 252,
}

impl ErrorCode {
	pub fn code(self) -> i32 {
		self as i32
	}

	pub fn status(self) -> StatusCode {
		match self {
			ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
			ErrorCode::ObjectNotFound => StatusCode::NOT_FOUND,
			_ => StatusCode::BAD_REQUEST,
		}
	}
}

#[derive(Debug)]
pub enum Error {
	/// Tagged error reported to the client as `{code, error}`
	Api { code: ErrorCode, message: Box<str> },
	/// Request rejected before reaching a handler, answered with HTTP 403
	Forbidden(Box<str>),
	NotFound,
	DbError,
	Parse,
	NetworkError(String),
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	pub fn api(code: ErrorCode, message: impl Into<Box<str>>) -> Self {
		Error::Api { code, message: message.into() }
	}

	/// The client-facing code of this error
	pub fn code(&self) -> ErrorCode {
		match self {
			Error::Api { code, .. } => *code,
			Error::Forbidden(_) => ErrorCode::OperationForbidden,
			Error::NotFound => ErrorCode::ObjectNotFound,
			_ => ErrorCode::InternalServerError,
		}
	}

	pub fn is_code(&self, code: ErrorCode) -> bool {
		self.code() == code
	}

	/// The client-facing message of this error
	pub fn message(&self) -> &str {
		match self {
			Error::Api { message, .. } | Error::Forbidden(message) => message,
			Error::NotFound => "Object not found.",
			_ => "Internal server error.",
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(_err: serde_json::Error) -> Self {
		Self::Parse
	}
}

impl From<axum::http::Error> for Error {
	fn from(err: axum::http::Error) -> Self {
		Self::Internal(err.to_string())
	}
}

impl From<tokio::task::JoinError> for Error {
	fn from(err: tokio::task::JoinError) -> Self {
		Self::Internal(err.to_string())
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::Api { code, message } => write!(f, "{} ({})", message, code.code()),
			Error::Forbidden(msg) => write!(f, "forbidden: {}", msg),
			Error::NetworkError(msg) => write!(f, "network error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
			_ => write!(f, "{:?}", self),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		if let Error::Forbidden(message) = &self {
			return (StatusCode::FORBIDDEN, Json(json!({ "error": message }))).into_response();
		}
		let code = self.code();
		if code == ErrorCode::InternalServerError && !matches!(self, Error::Api { .. }) {
			error!("request failed: {}", self);
		}
		let body = json!({ "code": code.code(), "error": self.message() });
		(code.status(), Json(body)).into_response()
	}
}


// vim: ts=4
