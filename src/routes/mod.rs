// ABOUTME: Route module organization for the course archive HTTP endpoints
// ABOUTME: Provides the shared API context and assembles the router with the auth gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route modules organized by domain. Each module contains thin handlers
//! over the database layer; the bearer-token gate wraps everything except
//! login and the health probes.

/// Authentication routes: login, verify, password rotation
pub mod auth;
/// Course CRUD routes
pub mod courses;
/// Health check and readiness routes
pub mod health;
/// Statistics aggregation routes
pub mod stats;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::middleware::require_auth;
use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;

pub use auth::{ChangePasswordRequest, LoginRequest, LoginResponse, UserInfo};
pub use health::HealthRoutes;

/// API context shared across all endpoints
#[derive(Clone)]
pub struct ApiContext {
    /// Database connection for persistence operations
    pub database: Database,
    /// Token issuance/verification; `None` when `JWT_SECRET` is unset.
    /// The misconfiguration surfaces at login time, not at boot.
    pub auth_manager: Option<Arc<AuthManager>>,
    /// Deployment-level rotation secret; `None` disables password rotation
    pub rotation_key: Option<String>,
}

impl ApiContext {
    /// Build the context from configuration and an initialized database
    #[must_use]
    pub fn new(database: Database, config: &ServerConfig) -> Self {
        let auth_manager = config.auth.jwt_secret.as_ref().map(|secret| {
            Arc::new(AuthManager::new(
                secret.as_bytes().to_vec(),
                config.auth.jwt_expiry_hours,
            ))
        });

        Self {
            database,
            auth_manager,
            rotation_key: config.auth.password_change_key.clone(),
        }
    }
}

/// Assemble the full application router
#[must_use]
pub fn router(context: ApiContext) -> Router {
    let context = Arc::new(context);

    // Protected routes short-circuit with 401 before their handlers run
    let protected = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/auth/change-password", post(auth::change_password))
        .nest("/api/courses", courses::routes())
        .nest("/api/stats", stats::routes())
        .route_layer(middleware::from_fn_with_state(
            context.clone(),
            require_auth,
        ));

    Router::new()
        .route("/auth/login", post(auth::login))
        .merge(HealthRoutes::routes())
        .merge(protected)
        .with_state(context)
}
