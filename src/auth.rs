// ABOUTME: JWT-based session token issuance and verification for the single admin
// ABOUTME: Handles token generation, signature validation, and expiry checking
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Authentication and Session Tokens
//!
//! This module issues and verifies the signed, time-bounded bearer tokens
//! that guard every protected route. Tokens are stateless: nothing is
//! persisted server-side, and a token becomes unusable only at expiry or
//! when the signing secret rotates. There is no revocation.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default session lifetime when `JWT_EXPIRES_IN_HOURS` is not set
pub const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;

/// JWT validation error with detailed information.
///
/// The detail is for server-side logging only; the verification gate
/// reports a uniform failure to callers regardless of variant.
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper JWT format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let expired_for = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "token expired {} seconds ago at {}",
                    expired_for.num_seconds(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// JWT claims for the admin session
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Credential id the token was issued for
    pub sub: String,
    /// Issued at timestamp (milliseconds, made unique per token)
    pub iat: i64,
    /// Expiration timestamp (seconds)
    pub exp: i64,
}

/// Authentication manager for session tokens
pub struct AuthManager {
    signing_secret: Vec<u8>,
    token_expiry_hours: i64,
    /// Monotonic counter to ensure unique issued-at times
    token_counter: AtomicU64,
}

impl Clone for AuthManager {
    fn clone(&self) -> Self {
        Self {
            signing_secret: self.signing_secret.clone(),
            token_expiry_hours: self.token_expiry_hours,
            // Fresh counter per instance; each maintains uniqueness independently
            token_counter: AtomicU64::new(0),
        }
    }
}

impl AuthManager {
    /// Create a new authentication manager with an HS256 signing secret
    #[must_use]
    pub const fn new(signing_secret: Vec<u8>, token_expiry_hours: i64) -> Self {
        Self {
            signing_secret,
            token_expiry_hours,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Configured token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a signed session token for the given credential id
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, subject_id: i64) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        // Atomic counter keeps issued-at unique even for back-to-back logins
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let unique_iat =
            now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0));

        let claims = Claims {
            sub: subject_id.to_string(),
            iat: unique_iat,
            exp: expiry.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_secret),
        )?;

        Ok(token)
    }

    /// Validate a session token with detailed error information
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if:
    /// - Token signature is invalid
    /// - Token has expired (the expiry instant itself counts as expired)
    /// - Token is malformed or not valid JWT format
    pub fn validate_token_detailed(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let claims = self.decode_token_claims(token)?;
        Self::validate_claims_expiry(&claims)?;
        Ok(claims)
    }

    /// Validate a session token and parse the subject as a credential id
    ///
    /// # Errors
    ///
    /// Fails for any invalid token, and for valid tokens whose subject is
    /// not a numeric id
    pub fn validate_subject(&self, token: &str) -> Result<i64, JwtValidationError> {
        let claims = self.validate_token_detailed(token)?;
        claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtValidationError::TokenInvalid {
                reason: format!("invalid subject id in token: {}", claims.sub),
            })
    }

    /// Decode token claims without expiration validation.
    /// Expiry is checked separately so the boundary instant is rejected.
    fn decode_token_claims(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.signing_secret),
            &validation,
        )
        .map(|token_data| token_data.claims)
        .map_err(|e| Self::convert_jwt_error(&e))
    }

    /// Check claims expiration; a token is valid strictly before `exp`
    fn validate_claims_expiry(claims: &Claims) -> Result<(), JwtValidationError> {
        let current_time = Utc::now();
        if current_time.timestamp() >= claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
            tracing::debug!(
                subject = %claims.sub,
                expired_at = %expired_at.to_rfc3339(),
                "Session token expired"
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }
        Ok(())
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::debug!("Session token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }
}

/// Generate a random signing secret, for deployments without one configured
#[must_use]
pub fn generate_jwt_secret() -> [u8; 64] {
    use rand::RngCore;

    let mut secret = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}
