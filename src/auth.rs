// ABOUTME: Bearer-token validation against the shared auth secret
// ABOUTME: HS256 JWT verification and the AuthUser request extractor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrack

//! # Authentication
//!
//! Authentication is delegated to the hosted auth service: the server only
//! validates the `Authorization: Bearer` token against the shared HS256
//! secret and extracts the subject. The raw token is kept on [`AuthUser`]
//! because the persistence gateway forwards it for row-level scoping.

use crate::errors::{AppError, AppResult};
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

/// Audience claim the hosted auth service stamps on user tokens
const TOKEN_AUDIENCE: &str = "authenticated";

/// Claims we care about from the hosted auth service's tokens
#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject: the user id
    sub: String,
    /// Email, when present in the token
    #[serde(default)]
    email: Option<String>,
}

/// Validates bearer tokens against the shared secret
#[derive(Clone)]
pub struct AuthManager {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthManager {
    /// Create a manager for the given shared HS256 secret
    #[must_use]
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate a bearer token and extract the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature, expiry, or audience check fails, or
    /// if the subject is not a valid user id.
    pub fn validate_bearer(&self, token: &str) -> AppResult<AuthUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::auth_invalid(format!("Token validation failed: {e}")))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid user id in token"))?;

        Ok(AuthUser {
            user_id,
            email: data.claims.email,
            token: token.to_owned(),
        })
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager").finish_non_exhaustive()
    }
}

/// The authenticated caller, extracted from the `Authorization` header
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User id from the token subject
    pub user_id: Uuid,
    /// Email from the token, when present
    pub email: Option<String>,
    /// The raw bearer token, forwarded to the persistence gateway
    pub token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthManager: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::auth_invalid("Invalid authorization header format - must be 'Bearer <token>'")
        })?;

        let manager = AuthManager::from_ref(state);
        manager.validate_bearer(token)
    }
}
