//! Bearer-token extractor and standalone verifier.
//!
//! Tokens are never stored in plain text: the registry maps the SHA-256 hex
//! digest of each token to the [`Actor`] it authenticates as.

use std::collections::HashMap;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use dayflow_core::{Actor, Mirror, SnapshotCache, TaskStore};
use sha2::{Digest, Sha256};

use crate::{AppState, error::ApiError};

/// Lowercase hex SHA-256 of `token`, the form tokens are configured in.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Token digests accepted by this server instance.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
  actors: HashMap<String, Actor>,
}

impl TokenRegistry {
  pub fn new() -> Self { Self::default() }

  /// Register the digest of a token. Digests are compared case-insensitively.
  pub fn insert(&mut self, token_sha256: &str, actor: Actor) {
    self
      .actors
      .insert(token_sha256.trim().to_ascii_lowercase(), actor);
  }

  /// The actor a plain-text token authenticates as.
  pub fn resolve(&self, token: &str) -> Option<&Actor> {
    self.actors.get(&hash_token(token))
  }

  pub fn len(&self) -> usize { self.actors.len() }

  pub fn is_empty(&self) -> bool { self.actors.is_empty() }
}

impl FromIterator<(String, Actor)> for TokenRegistry {
  fn from_iter<I: IntoIterator<Item = (String, Actor)>>(iter: I) -> Self {
    let mut registry = Self::new();
    for (digest, actor) in iter {
      registry.insert(&digest, actor);
    }
    registry
  }
}

/// Resolve the `Authorization: Bearer` header against `tokens`.
pub fn verify_bearer(
  headers: &HeaderMap,
  tokens: &TokenRegistry,
) -> Result<Actor, ApiError> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(ApiError::Unauthorized)?;

  tokens.resolve(token).cloned().ok_or_else(|| {
    tracing::debug!("rejected unknown bearer token");
    ApiError::Unauthorized
  })
}

/// The caller of an authenticated route.
pub struct Authenticated(pub Actor);

impl<C, M, T> FromRequestParts<AppState<C, M, T>> for Authenticated
where
  C: SnapshotCache + 'static,
  M: Mirror,
  T: TaskStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<C, M, T>,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, &state.tokens).map(Authenticated)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn registry() -> TokenRegistry {
    [
      (hash_token("admin-token"), Actor::admin("A1")),
      (hash_token("e1-token").to_uppercase(), Actor::employee("E1")),
    ]
    .into_iter()
    .collect()
  }

  fn bearer(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn hash_is_lowercase_sha256_hex() {
    assert_eq!(
      hash_token("abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn known_token_resolves_to_actor() {
    let actor = verify_bearer(&bearer("Bearer admin-token"), &registry()).unwrap();
    assert_eq!(actor, Actor::admin("A1"));
  }

  #[test]
  fn uppercase_digest_still_matches() {
    let actor = verify_bearer(&bearer("Bearer e1-token"), &registry()).unwrap();
    assert_eq!(actor, Actor::employee("E1"));
  }

  #[test]
  fn unknown_token_is_rejected() {
    let result = verify_bearer(&bearer("Bearer nope"), &registry());
    assert!(matches!(result, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn missing_or_non_bearer_header_is_rejected() {
    assert!(matches!(
      verify_bearer(&HeaderMap::new(), &registry()),
      Err(ApiError::Unauthorized)
    ));
    assert!(matches!(
      verify_bearer(&bearer("Basic dXNlcjpwYXNz"), &registry()),
      Err(ApiError::Unauthorized)
    ));
  }
}
