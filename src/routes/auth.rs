// ABOUTME: Authentication route handlers for login, token verification, and rotation
// ABOUTME: Implements the single-credential login and dual-gated password change
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication routes.
//!
//! The system holds exactly one admin credential. Login compares the
//! supplied password against the stored bcrypt hash and issues a signed,
//! time-bounded bearer token. Password rotation is gated behind two
//! independent secrets: the current password and a deployment-level
//! rotation key configured out-of-band, so a leaked password alone is
//! not enough to rotate the credential.

use crate::errors::{AppError, AppResult, FieldError};
use crate::middleware::AuthenticatedAdmin;
use crate::routes::ApiContext;
use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Minimum length accepted for a replacement password
const MIN_NEW_PASSWORD_LEN: usize = 6;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Admin identity echoed back to the client
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
}

/// Login response with the issued bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

/// Password rotation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    /// Deployment-level rotation key, distinct from any password
    pub key: String,
}

/// Plain success acknowledgment
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

/// Verification probe response
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub user: UserInfo,
}

/// `POST /auth/login`
///
/// Checks the supplied password against the sole stored credential and
/// issues a session token. Validation runs before any store access; the
/// signing-secret check is explicit because a missing secret is a
/// deployment bug (500), not a client error.
pub async fn login(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    if request.password.trim().is_empty() {
        return Err(AppError::validation(vec![FieldError::new(
            "password",
            "Password is required",
        )]));
    }

    let Some(admin) = context.database.get_admin().await? else {
        warn!("Login attempt against an unprovisioned deployment");
        return Err(AppError::unprovisioned());
    };

    // bcrypt is CPU-bound; verify on the blocking pool so the async
    // executor keeps servicing other requests
    let password = request.password;
    let password_hash = admin.password_hash.clone();
    let is_match = tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| AppError::internal(format!("password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password verification error: {e}")))?;

    if !is_match {
        warn!("Login failed: invalid password");
        return Err(AppError::auth_invalid("Invalid password"));
    }

    let Some(auth_manager) = context.auth_manager.as_deref() else {
        return Err(AppError::config_missing(
            "Server misconfiguration: JWT_SECRET is not set",
        ));
    };

    let token = auth_manager
        .generate_token(admin.id)
        .map_err(|e| AppError::internal(format!("token generation failed: {e}")))?;

    info!(admin_id = admin.id, "Login successful");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: UserInfo { id: admin.id },
    }))
}

/// `POST /auth/change-password`
///
/// Requires an already-authenticated caller. Gate order is fixed and
/// short-circuits on first failure: rotation key (403), subject lookup
/// (404), old password (401), then the in-place hash overwrite. Tokens
/// issued before the rotation remain valid until natural expiry.
pub async fn change_password(
    State(context): State<Arc<ApiContext>>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    let field_errors = validate_change_password(&request);
    if !field_errors.is_empty() {
        return Err(AppError::validation(field_errors));
    }

    // Operator-level gate first: without the rotation key, nothing else
    // is even consulted
    let key_matches = context
        .rotation_key
        .as_ref()
        .is_some_and(|expected| bool::from(request.key.as_bytes().ct_eq(expected.as_bytes())));
    if !key_matches {
        warn!(admin_id = admin.id, "Password change rejected: invalid rotation key");
        return Err(AppError::forbidden("Invalid authorization key"));
    }

    let Some(credential) = context.database.get_admin_by_id(admin.id).await? else {
        return Err(AppError::not_found("User"));
    };

    let old_password = request.old_password;
    let password_hash = credential.password_hash.clone();
    let is_match =
        tokio::task::spawn_blocking(move || bcrypt::verify(&old_password, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("password verification error: {e}")))?;

    if !is_match {
        warn!(admin_id = admin.id, "Password change rejected: old password incorrect");
        return Err(AppError::auth_invalid("Old password is incorrect"));
    }

    // Fresh salt on every rotation
    let new_password = request.new_password;
    let new_hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(&new_password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| AppError::internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("password hashing error: {e}")))?;

    context
        .database
        .update_admin_password(credential.id, &new_hash)
        .await?;

    info!(admin_id = admin.id, "Password changed");

    Ok(Json(Ack {
        success: true,
        message: "Password changed successfully".into(),
    }))
}

/// `GET /auth/verify`
///
/// Explicit probe for the verification gate: reaching this handler means
/// the middleware accepted the token, so it just echoes the subject.
pub async fn verify(
    Extension(admin): Extension<AuthenticatedAdmin>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(VerifyResponse {
        success: true,
        message: "Token is valid".into(),
        user: UserInfo { id: admin.id },
    }))
}

/// Field validation for the rotation request, before any store access
fn validate_change_password(request: &ChangePasswordRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if request.old_password.trim().is_empty() {
        errors.push(FieldError::new("oldPassword", "Old password is required"));
    }
    if request.new_password.trim().is_empty() {
        errors.push(FieldError::new("newPassword", "New password is required"));
    } else if request.new_password.len() < MIN_NEW_PASSWORD_LEN {
        errors.push(FieldError::new(
            "newPassword",
            "New password must be at least 6 characters",
        ));
    }
    if request.key.trim().is_empty() {
        errors.push(FieldError::new("key", "Authorization key is required"));
    }

    errors
}
