use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Duration, Utc};
use http::header;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// The caller behind a valid, unrevoked bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// What a valid token says about its holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// HS256 session tokens.
#[derive(Clone)]
pub struct JwtManager {
    secret: Arc<String>,
    expiry_hours: i64,
}

#[derive(Serialize, Deserialize)]
struct TokenPayload {
    sub: String,
    exp: i64,
    iat: i64,
    jti: String,
}

impl JwtManager {
    pub fn new(secret: String, expiry_hours: i64) -> Self {
        Self {
            secret: Arc::new(secret),
            expiry_hours,
        }
    }

    /// Generate a token for a `user_id`. Returns (token, `expires_at`).
    pub fn generate_token(
        &self,
        user_id: &str,
    ) -> Result<(String, DateTime<Utc>), jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiry_hours);

        let payload = TokenPayload {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok((token, expires_at))
    }

    /// Validate a token and return who holds it until when.
    pub fn validate_token(&self, token: &str) -> Option<TokenClaims> {
        let data = decode::<TokenPayload>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .ok()?;
        Some(TokenClaims {
            user_id: data.claims.sub,
            expires_at: DateTime::from_timestamp(data.claims.exp, 0)?,
        })
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        if state.database.is_token_revoked(token) {
            return Err(ApiError::Unauthorized);
        }
        let claims = state.jwt.validate_token(token).ok_or_else(|| {
            tracing::debug!("Rejected invalid or expired token");
            ApiError::Unauthorized
        })?;

        Ok(AuthenticatedUser {
            user_id: claims.user_id,
            token: token.to_string(),
            expires_at: claims.expires_at,
        })
    }
}
