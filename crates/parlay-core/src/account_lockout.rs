//! Account lockout policy
//!
//! Counts failed logins per user. Once the count reaches the configured
//! threshold the account stays locked for the configured number of minutes,
//! even for the correct password. A successful login resets the count.

use chrono::{Duration, Utc};
use serde_json::Value;

use crate::config::AccountLockoutPolicy;
use crate::prelude::*;
use parlay_types::{
	query::{Query, UpdateOp},
	types::{USER_CLASS, decode_date, encode_date},
};

pub const FAILED_LOGIN_COUNT: &str = "_failed_login_count";
pub const LOCKOUT_EXPIRES_AT: &str = "_account_lockout_expires_at";

/// Applies the lockout policy to a login attempt of `user`
///
/// Fails with `OBJECT_NOT_FOUND` while the account is locked, regardless of
/// `login_successful`. Does nothing when no policy is configured.
pub async fn handle_login_attempt(
	app: &App,
	user: &RestObject,
	login_successful: bool,
) -> ClResult<()> {
	let Some(policy) = app.config.account_lockout else {
		return Ok(());
	};
	let Some(user_id) = user.get("objectId").and_then(Value::as_str) else {
		return Err(Error::Internal("user without objectId".into()));
	};
	let query = Query::eq("objectId", user_id);

	// The caller's copy may be stale if attempts race
	let current = app.database.find_one(USER_CLASS, &query).await?.unwrap_or_else(|| user.clone());
	check_not_locked(&policy, &current)?;

	if login_successful {
		set_failed_login_count(app, &query, 0).await
	} else {
		handle_failed_login_attempt(app, &policy, &query, &current).await
	}
}

fn check_not_locked(policy: &AccountLockoutPolicy, user: &RestObject) -> ClResult<()> {
	let count = user.get(FAILED_LOGIN_COUNT).and_then(Value::as_i64).unwrap_or(0);
	let locked_until = user.get(LOCKOUT_EXPIRES_AT).and_then(decode_date);

	let locked =
		count >= i64::from(policy.threshold) && locked_until.is_some_and(|until| until > Utc::now());
	if locked {
		return Err(Error::api(
			ErrorCode::ObjectNotFound,
			format!(
				"Your account is locked due to multiple failed login attempts. Please try again after {} minute(s)",
				policy.duration
			),
		));
	}
	Ok(())
}

async fn set_failed_login_count(app: &App, query: &Query, count: i64) -> ClResult<()> {
	app.database
		.update(USER_CLASS, query, &[(FAILED_LOGIN_COUNT.into(), UpdateOp::Set(count.into()))])
		.await?;
	Ok(())
}

async fn handle_failed_login_attempt(
	app: &App,
	policy: &AccountLockoutPolicy,
	query: &Query,
	user: &RestObject,
) -> ClResult<()> {
	if !user.contains_key(FAILED_LOGIN_COUNT) {
		set_failed_login_count(app, query, 0).await?;
	}
	app.database
		.update(USER_CLASS, query, &[(FAILED_LOGIN_COUNT.into(), UpdateOp::Increment(1))])
		.await?;

	let count = app
		.database
		.find_one(USER_CLASS, query)
		.await?
		.and_then(|u| u.get(FAILED_LOGIN_COUNT).and_then(Value::as_i64))
		.unwrap_or(0);

	if count >= i64::from(policy.threshold) {
		let expires_at = Utc::now() + Duration::minutes(i64::from(policy.duration));
		info!("account locked after {} failed login attempts", count);
		app.database
			.update(USER_CLASS, query, &[(LOCKOUT_EXPIRES_AT.into(), UpdateOp::Set(encode_date(expires_at)))])
			.await?;
	}
	Ok(())
}

// vim: ts=4
