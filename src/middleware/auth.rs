// ABOUTME: Bearer-token authentication middleware guarding every protected route
// ABOUTME: Validates the session token and injects the admin subject into extensions
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The verification gate. Runs before every protected handler and
//! short-circuits the request on failure. Missing header, malformed
//! token, bad signature, and expired token all surface as a uniform 401
//! so callers learn nothing about the reason.

use crate::errors::AppError;
use crate::routes::ApiContext;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use std::sync::Arc;

/// The authenticated subject, injected into request extensions by
/// [`require_auth`] for downstream handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAdmin {
    /// Credential id established by token verification
    pub id: i64,
}

/// Axum middleware enforcing bearer-token authentication
///
/// # Errors
///
/// Returns a uniform `401 Unauthorized` whenever the token is missing,
/// malformed, forged, or expired
pub async fn require_auth(
    State(context): State<Arc<ApiContext>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Security: header content is never logged to prevent token leakage
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(|h| h.strip_prefix("Bearer ")) else {
        tracing::debug!("Authentication failed: missing or non-bearer authorization header");
        return Err(AppError::auth_required());
    };

    // Without a signing secret no token can possibly verify
    let Some(auth_manager) = context.auth_manager.as_deref() else {
        tracing::warn!("Authentication failed: no signing secret configured");
        return Err(AppError::auth_required());
    };

    let subject = auth_manager.validate_subject(token).map_err(|e| {
        tracing::debug!("Authentication failed: {e}");
        AppError::auth_required()
    })?;

    req.extensions_mut()
        .insert(AuthenticatedAdmin { id: subject });

    Ok(next.run(req).await)
}
