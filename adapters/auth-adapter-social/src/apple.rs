//! Apple Sign-In
//!
//! `authData.apple` is `{id, token}` where `token` is the identity token
//! returned by Apple. The token must be an RS256 JWT signed by one of
//! Apple's published keys, issued by Apple, addressed to one of the
//! configured client ids, and its subject must be the claimed `id`.

use async_trait::async_trait;
use jsonwebtoken::{
	Algorithm, DecodingKey, Validation, decode, decode_header,
	errors::ErrorKind,
	jwk::{Jwk, JwkSet},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use parlay::{auth_provider::AuthProvider, prelude::*, types::id_string};

use crate::http::HttpClient;

pub const TOKEN_ISSUER: &str = "https://appleid.apple.com";
pub const APPLE_KEYS_URL: &str = "https://appleid.apple.com/auth/keys";
const DEFAULT_KEYS_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_KEYS_MIN_REFRESH: Duration = Duration::from_secs(60);

fn invalid(message: impl Into<Box<str>>) -> Error {
	Error::api(ErrorCode::ObjectNotFound, message)
}

#[derive(Clone, Debug, Default)]
pub struct AppleOptions {
	/// Accepted `aud` values. Every token is rejected while this is empty.
	pub client_ids: Vec<String>,
	/// Overrides the JWKS endpoint
	pub keys_url: Option<String>,
	/// How long fetched keys are trusted before they are fetched again
	pub keys_ttl: Option<Duration>,
	/// Shortest time between refetches caused by an unknown key id
	pub keys_min_refresh: Option<Duration>,
}

/// Verified identity token claims
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AppleClaims {
	#[serde(default)]
	pub iss: String,
	#[serde(default)]
	pub aud: String,
	#[serde(default)]
	pub sub: String,
	pub exp: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email_verified: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nonce: Option<String>,
}

// JwksCache //
//***********//
#[derive(Debug)]
struct CachedKeys {
	fetched_at: Instant,
	keys: Arc<JwkSet>,
}

/// Apple's signing keys, fetched on demand and kept for a limited time
///
/// A failed fetch clears the cache. A key id missing from the cached set
/// triggers a refetch, so key rotation is picked up without waiting for
/// the TTL. Such refetches happen at most once per `min_refresh`.
#[derive(Debug)]
pub struct JwksCache {
	keys_url: Box<str>,
	ttl: Duration,
	min_refresh: Duration,
	cached: RwLock<Option<CachedKeys>>,
}

impl JwksCache {
	pub fn new(keys_url: impl Into<Box<str>>, ttl: Duration, min_refresh: Duration) -> Self {
		Self { keys_url: keys_url.into(), ttl, min_refresh, cached: RwLock::new(None) }
	}

	pub fn invalidate(&self) {
		*self.cached.write() = None;
	}

	/// Cached keys within their TTL, with the time since they were fetched
	fn fresh(&self) -> Option<(Arc<JwkSet>, Duration)> {
		self.cached
			.read()
			.as_ref()
			.map(|cached| (cached.keys.clone(), cached.fetched_at.elapsed()))
			.filter(|(_, age)| *age < self.ttl)
	}

	async fn refresh(&self, client: &HttpClient) -> ClResult<Arc<JwkSet>> {
		debug!("Fetching JWKS from {}", self.keys_url);
		let res = client
			.get_json(&self.keys_url, &[])
			.await
			.and_then(|value| serde_json::from_value::<JwkSet>(value).map_err(Error::from));
		match res {
			Ok(keys) => {
				let keys = Arc::new(keys);
				*self.cached.write() =
					Some(CachedKeys { fetched_at: Instant::now(), keys: keys.clone() });
				Ok(keys)
			}
			Err(err) => {
				warn!("JWKS fetch from {} failed: {}", self.keys_url, err);
				self.invalidate();
				Err(invalid("Unable to fetch Apple public keys."))
			}
		}
	}

	async fn get_key(&self, client: &HttpClient, kid: &str) -> ClResult<DecodingKey> {
		if let Some((keys, age)) = self.fresh() {
			if let Some(jwk) = keys.find(kid) {
				return decoding_key(jwk);
			}
			if age < self.min_refresh {
				debug!("Key ID {} not in JWKS fetched {:?} ago", kid, age);
				return Err(key_not_found(kid));
			}
			debug!("Key ID {} not in cached JWKS, refreshing", kid);
		}

		let keys = self.refresh(client).await?;
		match keys.find(kid) {
			Some(jwk) => decoding_key(jwk),
			None => Err(key_not_found(kid)),
		}
	}
}

fn key_not_found(kid: &str) -> Error {
	invalid(format!("Unable to find matching key for Key ID: {}", kid))
}

fn decoding_key(jwk: &Jwk) -> ClResult<DecodingKey> {
	DecodingKey::from_jwk(jwk).map_err(|err| {
		warn!("Unusable JWK: {}", err);
		invalid("id token is invalid for this user.")
	})
}

// AppleProvider //
//***************//
#[derive(Debug)]
pub struct AppleProvider {
	client_ids: Vec<String>,
	keys: JwksCache,
	client: HttpClient,
}

impl AppleProvider {
	pub fn new(options: AppleOptions) -> Self {
		let keys_url = options.keys_url.unwrap_or_else(|| APPLE_KEYS_URL.to_string());
		let ttl = options.keys_ttl.unwrap_or(DEFAULT_KEYS_TTL);
		let min_refresh = options.keys_min_refresh.unwrap_or(DEFAULT_KEYS_MIN_REFRESH);

		Self {
			client_ids: options.client_ids,
			keys: JwksCache::new(keys_url, ttl, min_refresh),
			client: HttpClient::new(),
		}
	}

	/// Verifies an identity token issued for `id` and returns its claims
	pub async fn verify_id_token(&self, token: &str, id: &str) -> ClResult<AppleClaims> {
		if token.is_empty() {
			return Err(invalid("id token is invalid for this user."));
		}

		let header = decode_header(token)
			.map_err(|_| invalid("provided token does not decode as JWT"))?;
		let kid = header.kid.ok_or_else(|| invalid("id token is invalid for this user."))?;
		let key = self.keys.get_key(&self.client, &kid).await?;

		let mut validation = Validation::new(Algorithm::RS256);
		validation.validate_aud = false;
		validation.set_required_spec_claims(&["exp"]);

		let claims = decode::<AppleClaims>(token, &key, &validation)
			.map_err(|err| match err.kind() {
				ErrorKind::ExpiredSignature => invalid("id token is expired"),
				_ => invalid("id token is invalid for this user."),
			})?
			.claims;

		if claims.iss != TOKEN_ISSUER {
			return Err(invalid(format!(
				"id token not issued by correct OpenID provider - expected: {} | from: {}",
				TOKEN_ISSUER, claims.iss
			)));
		}
		if !self.client_ids.iter().any(|client_id| *client_id == claims.aud) {
			return Err(invalid(format!(
				"jwt aud parameter does not include this client - is: {} | expected: {}",
				claims.aud,
				self.client_ids.join(",")
			)));
		}
		if claims.sub != id {
			return Err(invalid("auth data is invalid for this user."));
		}

		Ok(claims)
	}
}

#[async_trait]
impl AuthProvider for AppleProvider {
	fn name(&self) -> &str {
		"apple"
	}

	async fn validate_auth_data(&self, auth_data: &Value) -> ClResult<()> {
		let token = auth_data.get("token").and_then(Value::as_str).unwrap_or_default();
		let id = auth_data.get("id").and_then(id_string).unwrap_or_default();
		self.verify_id_token(token, &id).await?;
		Ok(())
	}
}

// vim: ts=4
