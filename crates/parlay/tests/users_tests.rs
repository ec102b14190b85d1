//! Users router tests: signup, login, sessions, account policies, password
//! reset, and email verification

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

use common::{MASTER_KEY, TestServer, fixtures::TokenProvider, test_config};
use parlay::{
	config::{AccountLockoutPolicy, PasswordPolicy},
	query::{Query, UpdateOp},
	types::{USER_CLASS, encode_date},
};

const MASTER: (&str, &str) = ("x-parse-master-key", MASTER_KEY);

async fn server_with_bob() -> (TestServer, Value) {
	let server = TestServer::new().await;
	let res = server
		.signup(json!({ "username": "bob", "password": "secret", "email": "bob@example.com" }))
		.await;
	(server, res)
}

// Signup //
//********//

#[tokio::test]
async fn test_signup() {
	let (server, res) = server_with_bob().await;

	let object_id = res["objectId"].as_str().unwrap();
	assert!(res["createdAt"].is_string());
	assert!(res["sessionToken"].as_str().unwrap().starts_with("r:"));

	// The session token is usable right away
	let token = res["sessionToken"].as_str().unwrap();
	let (status, me) = server.get("/users/me", &[("x-parse-session-token", token)]).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(me["objectId"], object_id);
	assert_eq!(me["username"], "bob");
	assert!(me.get("password").is_none());
	assert!(me.get("_hashed_password").is_none());
}

#[tokio::test]
async fn test_signup_sets_location() {
	let server = TestServer::new().await;
	let req = axum::http::Request::builder()
		.method("POST")
		.uri("/parse/users")
		.header("x-parse-application-id", common::APP_ID)
		.header("content-type", "application/json")
		.body(axum::body::Body::from(r#"{"username":"amy","password":"pw"}"#))
		.unwrap();

	let (status, headers, body) = server.send(req).await;
	assert_eq!(status, StatusCode::CREATED);
	let res: Value = serde_json::from_slice(&body).unwrap();
	let location = headers.get("location").unwrap().to_str().unwrap();
	assert_eq!(location, format!("{}/users/{}", common::MOUNT, res["objectId"].as_str().unwrap()));
}

#[tokio::test]
async fn test_signup_validation() {
	let (server, _) = server_with_bob().await;

	let (status, res) = server.post("/users", &[], json!({ "password": "pw" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 200, "error": "bad or missing username" }));

	let (_, res) = server.post("/users", &[], json!({ "username": "amy" })).await;
	assert_eq!(res, json!({ "code": 201, "error": "password is required" }));

	let (_, res) = server.post("/users", &[], json!({ "username": "bob", "password": "pw" })).await;
	assert_eq!(res, json!({ "code": 202, "error": "Account already exists for this username." }));

	let body = json!({ "username": "amy", "password": "pw", "email": "bob@example.com" });
	let (_, res) = server.post("/users", &[], body).await;
	assert_eq!(res, json!({ "code": 203, "error": "Account already exists for this email address." }));

	let body = json!({ "username": "amy", "password": "pw", "email": "not-an-email" });
	let (_, res) = server.post("/users", &[], body).await;
	assert_eq!(res["code"], 125);

	let body = json!({ "username": "amy", "password": "pw", "emailVerified": true });
	let (_, res) = server.post("/users", &[], body).await;
	assert_eq!(res["code"], 119);

	let body = json!({ "username": "amy", "password": "pw", "_secret": 1 });
	let (_, res) = server.post("/users", &[], body).await;
	assert_eq!(res["code"], 105);
}

// Login //
//*******//

#[tokio::test]
async fn test_login() {
	let (server, signup) = server_with_bob().await;

	let (status, res) =
		server.post("/login", &[], json!({ "username": "bob", "password": "secret" })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["objectId"], signup["objectId"]);
	assert_eq!(res["email"], "bob@example.com");
	assert!(res["sessionToken"].as_str().unwrap().starts_with("r:"));
	assert_ne!(res["sessionToken"], signup["sessionToken"]);
	assert!(res.get("_hashed_password").is_none());
	assert!(res.get("password").is_none());

	// By email
	let (status, _) =
		server.post("/login", &[], json!({ "email": "bob@example.com", "password": "secret" })).await;
	assert_eq!(status, StatusCode::OK);

	// An email in the username field
	let (status, _) =
		server.post("/login", &[], json!({ "username": "bob@example.com", "password": "secret" })).await;
	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_from_query_string() {
	let (server, _) = server_with_bob().await;

	let (status, res) = server.get("/login?username=bob&password=secret", &[]).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["username"], "bob");
}

#[tokio::test]
async fn test_login_errors() {
	let (server, _) = server_with_bob().await;

	let (status, res) = server.post("/login", &[], json!({ "password": "secret" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 200, "error": "username/email is required." }));

	let (status, res) = server.post("/login", &[], json!({ "username": "bob" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 201, "error": "password is required." }));

	let (status, res) =
		server.post("/login", &[], json!({ "username": "bob", "password": "wrong" })).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(res, json!({ "code": 101, "error": "Invalid username/password." }));

	let (status, _) =
		server.post("/login", &[], json!({ "username": "nobody", "password": "secret" })).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, res) = server.post("/login", &[], json!({ "username": "bob", "password": 42 })).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(res["code"], 101);
}

#[tokio::test]
async fn test_login_prefers_exact_username() {
	let server = TestServer::new().await;
	server
		.signup(json!({ "username": "alice", "password": "alice-pw", "email": "carol@example.com" }))
		.await;
	let carol = server
		.signup(json!({ "username": "carol@example.com", "password": "carol-pw" }))
		.await;

	let body = json!({ "username": "carol@example.com", "password": "carol-pw" });
	let (status, res) = server.post("/login", &[], body).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["objectId"], carol["objectId"]);
}

#[tokio::test]
async fn test_login_locked_account() {
	let mut config = test_config();
	config.account_lockout = Some(AccountLockoutPolicy { duration: 5, threshold: 2 });
	let server = TestServer::with_config(config, Vec::new()).await;
	server.signup(json!({ "username": "bob", "password": "secret" })).await;

	for _ in 0..2 {
		let (status, _) =
			server.post("/login", &[], json!({ "username": "bob", "password": "wrong" })).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}

	// The correct password is rejected while the account is locked
	let (status, res) =
		server.post("/login", &[], json!({ "username": "bob", "password": "secret" })).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(res["code"], 101);
	assert_eq!(
		res["error"],
		"Your account is locked due to multiple failed login attempts. Please try again after 5 minute(s)"
	);
}

#[tokio::test]
async fn test_login_failures_below_threshold() {
	let mut config = test_config();
	config.account_lockout = Some(AccountLockoutPolicy { duration: 5, threshold: 3 });
	let server = TestServer::with_config(config, Vec::new()).await;
	server.signup(json!({ "username": "bob", "password": "secret" })).await;

	for _ in 0..2 {
		server.post("/login", &[], json!({ "username": "bob", "password": "wrong" })).await;
	}
	server.login("bob", "secret").await;

	// The successful login reset the counter
	for _ in 0..2 {
		server.post("/login", &[], json!({ "username": "bob", "password": "wrong" })).await;
	}
	server.login("bob", "secret").await;
}

#[tokio::test]
async fn test_login_empty_acl() {
	let (server, signup) = server_with_bob().await;
	let id = signup["objectId"].as_str().unwrap();

	let (status, _) =
		server.request(axum::http::Method::PUT, &format!("/users/{}", id), &[MASTER], Some(json!({ "ACL": {} }))).await;
	assert_eq!(status, StatusCode::OK);

	let body = json!({ "username": "bob", "password": "secret" });
	let (status, res) = server.post("/login", &[], body.clone()).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(res["error"], "Invalid username/password.");

	// The master key bypasses the ACL
	let (status, _) = server.post("/login", &[MASTER], body).await;
	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_unverified_email() {
	let mut config = test_config();
	config.verify_user_emails = true;
	config.prevent_login_with_unverified_email = true;
	let server = TestServer::with_config(config, Vec::new()).await;

	let res = server
		.signup(json!({ "username": "bob", "password": "secret", "email": "bob@example.com" }))
		.await;
	assert!(res.get("sessionToken").is_none());
	assert_eq!(server.email.count("verify"), 1);
	let link = server.email.last_link("verify").unwrap();
	assert!(link.starts_with("http://localhost:1337/parse/apps/test-app/verify_email?token="));
	assert!(link.ends_with("&username=bob"));

	let (status, res) =
		server.post("/login", &[], json!({ "username": "bob", "password": "secret" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 205, "error": "User email is not verified." }));

	let id = res_id(&server, "bob").await;
	let update: [(Box<str>, UpdateOp); 1] = [("emailVerified".into(), UpdateOp::Set(true.into()))];
	server.app.database.update(USER_CLASS, &Query::eq("objectId", id.as_str()), &update).await.unwrap();
	server.login("bob", "secret").await;
}

#[tokio::test]
async fn test_login_expired_password() {
	let mut config = test_config();
	config.password_policy =
		Some(PasswordPolicy { max_password_age: Some(30), reset_token_validity_duration: None });
	let server = TestServer::with_config(config, Vec::new()).await;
	server.signup(json!({ "username": "bob", "password": "secret" })).await;
	server.login("bob", "secret").await;

	let id = res_id(&server, "bob").await;
	let changed_at = encode_date(Utc::now() - Duration::days(31));
	let update: [(Box<str>, UpdateOp); 1] = [("_password_changed_at".into(), UpdateOp::Set(changed_at))];
	server.app.database.update(USER_CLASS, &Query::eq("objectId", id.as_str()), &update).await.unwrap();

	let (status, res) =
		server.post("/login", &[], json!({ "username": "bob", "password": "secret" })).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(res["error"], "Your password has expired. Please reset your password.");
}

async fn res_id(server: &TestServer, username: &str) -> String {
	let user = server.app.database.find_one(USER_CLASS, &Query::eq("username", username)).await.unwrap().unwrap();
	user["objectId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_verify_password() {
	let (server, _) = server_with_bob().await;

	let (status, res) = server.get("/verifyPassword?username=bob&password=secret", &[]).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["username"], "bob");
	assert!(res.get("sessionToken").is_none());

	let (status, _) = server.get("/verifyPassword?username=bob&password=nope", &[]).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

// Sessions //
//**********//

#[tokio::test]
async fn test_me_and_logout() {
	let (server, _) = server_with_bob().await;
	let token = server.login("bob", "secret").await;
	let session = [("x-parse-session-token", token.as_str())];

	let (status, me) = server.get("/users/me", &session).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(me["sessionToken"], token.as_str());

	let (status, res) = server.post("/logout", &session, json!({})).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res, json!({}));

	let (status, res) = server.get("/users/me", &session).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 209, "error": "Invalid session token" }));

	let (_, res) = server.get("/users/me", &[]).await;
	assert_eq!(res["code"], 209);
}

#[tokio::test]
async fn test_requires_application_id() {
	let server = TestServer::new().await;
	let req = axum::http::Request::builder()
		.uri("/parse/users/me")
		.body(axum::body::Body::empty())
		.unwrap();

	let (status, _, body) = server.send(req).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let res: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(res, json!({ "error": "unauthorized" }));
}

// Password reset and email verification //
//***************************************//

#[tokio::test]
async fn test_request_password_reset() {
	let (server, _) = server_with_bob().await;

	let (status, res) =
		server.post("/requestPasswordReset", &[], json!({ "email": "bob@example.com" })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res, json!({}));
	assert_eq!(server.email.count("reset"), 1);
	let link = server.email.last_link("reset").unwrap();
	assert!(link.starts_with("http://localhost:1337/parse/apps/test-app/request_password_reset?token="));

	let (status, res) =
		server.post("/requestPasswordReset", &[], json!({ "email": "nobody@example.com" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 205, "error": "No user found with email nobody@example.com." }));

	let (_, res) = server.post("/requestPasswordReset", &[], json!({})).await;
	assert_eq!(res, json!({ "code": 204, "error": "you must provide an email" }));

	let (_, res) = server.post("/requestPasswordReset", &[], json!({ "email": 42 })).await;
	assert_eq!(res, json!({ "code": 125, "error": "you must provide a valid email string" }));
}

#[tokio::test]
async fn test_email_features_need_configuration() {
	let mut config = test_config();
	config.public_server_url = None;
	let server = TestServer::with_config(config, Vec::new()).await;

	let (status, res) =
		server.post("/requestPasswordReset", &[], json!({ "email": "bob@example.com" })).await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(res["code"], 1);
	assert_eq!(
		res["error"],
		"An appName, publicServerURL, and emailAdapter are required for password reset and email verification functionality."
	);
}

#[tokio::test]
async fn test_verification_email_request() {
	let mut config = test_config();
	config.verify_user_emails = true;
	let server = TestServer::with_config(config, Vec::new()).await;
	server
		.signup(json!({ "username": "bob", "password": "secret", "email": "bob@example.com" }))
		.await;
	assert_eq!(server.email.count("verify"), 1);
	let first_link = server.email.last_link("verify").unwrap();

	let (status, res) =
		server.post("/verificationEmailRequest", &[], json!({ "email": "bob@example.com" })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res, json!({}));
	assert_eq!(server.email.count("verify"), 2);
	assert_ne!(server.email.last_link("verify").unwrap(), first_link);

	let (_, res) =
		server.post("/verificationEmailRequest", &[], json!({ "email": "nobody@example.com" })).await;
	assert_eq!(res, json!({ "code": 205, "error": "No user found with email nobody@example.com" }));

	let id = res_id(&server, "bob").await;
	let update: [(Box<str>, UpdateOp); 1] = [("emailVerified".into(), UpdateOp::Set(true.into()))];
	server.app.database.update(USER_CLASS, &Query::eq("objectId", id.as_str()), &update).await.unwrap();

	let (status, res) =
		server.post("/verificationEmailRequest", &[], json!({ "email": "bob@example.com" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": -1, "error": "Email bob@example.com is already verified." }));
}

// CRUD //
//******//

#[tokio::test]
async fn test_find_and_get() {
	let (server, signup) = server_with_bob().await;
	server.signup(json!({ "username": "amy", "password": "pw" })).await;

	let (status, res) = server.get("/users", &[]).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["results"].as_array().unwrap().len(), 2);

	let (_, res) = server.get("/users?where=%7B%22username%22%3A%22bob%22%7D", &[]).await;
	let results = res["results"].as_array().unwrap();
	assert_eq!(results.len(), 1);
	assert_eq!(results[0]["objectId"], signup["objectId"]);
	assert!(results[0].get("_hashed_password").is_none());

	let (_, res) = server.get("/users?limit=1", &[]).await;
	assert_eq!(res["results"].as_array().unwrap().len(), 1);

	let (status, res) = server.get("/users?where=not-json", &[]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res["code"], 107);

	let id = signup["objectId"].as_str().unwrap();
	let (status, res) = server.get(&format!("/users/{}", id), &[]).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["username"], "bob");

	let (status, res) = server.get("/users/missing", &[]).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(res, json!({ "code": 101, "error": "Object not found." }));
}

#[tokio::test]
async fn test_update() {
	let (server, signup) = server_with_bob().await;
	let amy = server.signup(json!({ "username": "amy", "password": "pw" })).await;
	let id = signup["objectId"].as_str().unwrap();
	let path = format!("/users/{}", id);
	let put = axum::http::Method::PUT;

	// Another user's session cannot modify bob
	let amy_session = [("x-parse-session-token", amy["sessionToken"].as_str().unwrap())];
	let (status, res) =
		server.request(put.clone(), &path, &amy_session, Some(json!({ "nick": "x" }))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 206, "error": format!("Cannot modify user {}.", id) }));

	let bob_session = [("x-parse-session-token", signup["sessionToken"].as_str().unwrap())];
	let (status, res) =
		server.request(put.clone(), &path, &bob_session, Some(json!({ "nick": "bobby" }))).await;
	assert_eq!(status, StatusCode::OK);
	assert!(res["updatedAt"].is_string());

	let (_, res) =
		server.request(put.clone(), &path, &bob_session, Some(json!({ "username": "amy" }))).await;
	assert_eq!(res["code"], 202);

	let (_, res) =
		server.request(put.clone(), &path, &bob_session, Some(json!({ "emailVerified": true }))).await;
	assert_eq!(res["code"], 119);

	let (_, res) = server.get(&path, &[]).await;
	assert_eq!(res["nick"], "bobby");
}

#[tokio::test]
async fn test_update_increment_overflow() {
	let (server, signup) = server_with_bob().await;
	let path = format!("/users/{}", signup["objectId"].as_str().unwrap());
	let put = axum::http::Method::PUT;
	let bob_session = [("x-parse-session-token", signup["sessionToken"].as_str().unwrap())];

	let (status, _) =
		server.request(put.clone(), &path, &bob_session, Some(json!({ "score": i64::MAX }))).await;
	assert_eq!(status, StatusCode::OK);

	let increment = json!({ "score": { "__op": "Increment", "amount": 1 }, "nick": "bobby" });
	let (status, res) = server.request(put.clone(), &path, &bob_session, Some(increment)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 107, "error": "incrementing must provide a number" }));

	// The rejected update changed nothing
	let (_, res) = server.get(&path, &[]).await;
	assert_eq!(res["score"], i64::MAX);
	assert!(res.get("nick").is_none());
}

#[tokio::test]
async fn test_find_rejects_hidden_field_constraints() {
	let (server, _signup) = server_with_bob().await;

	// {"_failed_login_count":0}
	let path = "/users?where=%7B%22_failed_login_count%22%3A0%7D";
	let (status, res) = server.get(path, &[]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 105, "error": "Invalid key name: _failed_login_count" }));

	// {"$or":[{"username":"x"},{"_hashed_password":"y"}]}
	let path = "/users?where=%7B%22%24or%22%3A%5B%7B%22username%22%3A%22x%22%7D%2C%7B%22_hashed_password%22%3A%22y%22%7D%5D%7D";
	let (status, res) = server.get(path, &[]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res["code"], 105);

	// {"authData.apple.id":"42"}
	let path = "/users?where=%7B%22authData.apple.id%22%3A%2242%22%7D";
	let (status, res) = server.get(path, &[]).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["results"], json!([]));

	// The master key may query server-managed fields
	let (status, res) = server.get("/users?where=%7B%22_failed_login_count%22%3A0%7D", &[MASTER]).await;
	assert_eq!(status, StatusCode::OK);
	assert!(res["results"].is_array());
}

#[tokio::test]
async fn test_password_change_revokes_other_sessions() {
	let (server, signup) = server_with_bob().await;
	let id = signup["objectId"].as_str().unwrap();
	let other = server.login("bob", "secret").await;
	let current = signup["sessionToken"].as_str().unwrap();

	let (status, _) = server
		.request(
			axum::http::Method::PUT,
			&format!("/users/{}", id),
			&[("x-parse-session-token", current)],
			Some(json!({ "password": "new-secret" })),
		)
		.await;
	assert_eq!(status, StatusCode::OK);

	let (status, _) = server.get("/users/me", &[("x-parse-session-token", current)]).await;
	assert_eq!(status, StatusCode::OK);
	let (status, _) = server.get("/users/me", &[("x-parse-session-token", other.as_str())]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	server.login("bob", "new-secret").await;
	let (status, _) =
		server.post("/login", &[], json!({ "username": "bob", "password": "secret" })).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete() {
	let (server, signup) = server_with_bob().await;
	let amy = server.signup(json!({ "username": "amy", "password": "pw" })).await;
	let id = signup["objectId"].as_str().unwrap();
	let path = format!("/users/{}", id);
	let delete = axum::http::Method::DELETE;

	let (status, res) = server.request(delete.clone(), &path, &[], None).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 206, "error": "Insufficient auth to delete user" }));

	let amy_session = [("x-parse-session-token", amy["sessionToken"].as_str().unwrap())];
	let (status, _) = server.request(delete.clone(), &path, &amy_session, None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let token = signup["sessionToken"].as_str().unwrap();
	let (status, res) =
		server.request(delete.clone(), &path, &[("x-parse-session-token", token)], None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res, json!({}));

	let (status, _) = server.get(&path, &[]).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = server.get("/users/me", &[("x-parse-session-token", token)]).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

// Third-party authData //
//**********************//

#[tokio::test]
async fn test_auth_data_signup_and_login() {
	let providers: Vec<Arc<dyn parlay::auth_provider::AuthProvider>> =
		vec![Arc::new(TokenProvider { name: "acme" })];
	let server = TestServer::with_config(test_config(), providers).await;
	let auth_data = json!({ "authData": { "acme": { "id": "7", "token": "valid-7" } } });

	let (status, created) = server.post("/users", &[], auth_data.clone()).await;
	assert_eq!(status, StatusCode::CREATED);
	assert!(created["sessionToken"].as_str().unwrap().starts_with("r:"));

	// The same provider id logs the linked user in
	let (status, res) = server.post("/users", &[], auth_data).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(res["objectId"], created["objectId"]);
	assert_eq!(res["authData"]["acme"]["id"], "7");
	assert_eq!(res["username"].as_str().unwrap().len(), 25);
	assert_ne!(res["sessionToken"], created["sessionToken"]);

	let bad = json!({ "authData": { "acme": { "id": "7", "token": "forged" } } });
	let (status, res) = server.post("/users", &[], bad).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(res["code"], 101);

	let unknown = json!({ "authData": { "other": { "id": "7" } } });
	let (status, res) = server.post("/users", &[], unknown).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(res, json!({ "code": 252, "error": "This authentication method is unsupported." }));
}

#[tokio::test]
async fn test_auth_data_hidden_from_other_users() {
	let providers: Vec<Arc<dyn parlay::auth_provider::AuthProvider>> =
		vec![Arc::new(TokenProvider { name: "acme" })];
	let server = TestServer::with_config(test_config(), providers).await;
	let body = json!({ "username": "zed", "authData": { "acme": { "id": "9", "token": "valid-9" } } });
	let (_, created) = server.post("/users", &[], body).await;
	let path = format!("/users/{}", created["objectId"].as_str().unwrap());

	let (_, res) = server.get(&path, &[]).await;
	assert!(res.get("authData").is_none());

	let token = created["sessionToken"].as_str().unwrap();
	let (_, res) = server.get(&path, &[("x-parse-session-token", token)]).await;
	assert_eq!(res["authData"]["acme"]["id"], "9");

	let (_, res) = server.get(&path, &[MASTER]).await;
	assert_eq!(res["authData"]["acme"]["id"], "9");
}

// vim: ts=4
