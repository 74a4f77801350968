//! Stateless bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user's uuid, handle and admin flag, valid for a
//! fixed 30 days. Nothing is stored server-side: a token is valid when its signature
//! checks out and it has not expired. Whether the user behind it is still active is a
//! separate step, see `AuthService::check_liveness`.

use crate::config::AuthConfig;
use crate::error::app_error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User uuid.
    pub sub: Uuid,
    pub handle: String,
    pub is_admin: bool,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Refuses to build a service without a usable secret.
    pub fn from_config(auth: &AuthConfig) -> Result<Self, AppError> {
        let secret = auth.signing_secret().map_err(AppError::configuration)?;
        Ok(Self::new(secret))
    }

    pub fn issue(&self, user_id: Uuid, handle: &str, is_admin: bool) -> Result<String, AppError> {
        self.issue_at(user_id, handle, is_admin, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, handle: &str, is_admin: bool, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            handle: handle.to_string(),
            is_admin,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| AppError::token("Failed to sign token", e))
    }

    /// Checks signature, structure and expiry. Any failure is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "bad signature",
                    _ => "malformed",
                };
                debug!(reason, "bearer token rejected");
                Err(AppError::Unauthorized)
            }
        }
    }
}
