//! Bearer-token actor extraction.
//!
//! Token issuance lives with the external identity provider; this server
//! only verifies the HMAC signature and lifts the claims into an `Actor`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;

use referra_core::users::{Actor, RoleKind};
use referra_core::Error;

use crate::error::ApiError;
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    /// Role discriminant, e.g. "BUSINESS".
    role: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Extractor for the authenticated actor behind `Authorization: Bearer ...`.
pub struct AuthActor(pub Actor);

impl FromRequestParts<Arc<AppState>> for AuthActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError(Error::Unauthorized("missing authorization header".into()))
            })?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError(Error::Unauthorized("expected a bearer token".into()))
        })?;

        let claims = decode::<Claims>(token, &state.jwt_decoding_key, &Validation::default())
            .map_err(|e| ApiError(Error::Unauthorized(format!("invalid token: {e}"))))?
            .claims;
        let role = RoleKind::parse(&claims.role)
            .map_err(|_| ApiError(Error::Unauthorized("unknown role in token".into())))?;

        Ok(AuthActor(Actor::new(claims.sub, role)))
    }
}

pub fn decoding_key(secret: &str) -> DecodingKey {
    DecodingKey::from_secret(secret.as_bytes())
}
