// ABOUTME: Request middleware for authentication and cross-origin access
// ABOUTME: Provides the bearer-token verification gate and CORS configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Bearer-token verification gate for protected routes
pub mod auth;
/// CORS layer configuration
pub mod cors;

pub use auth::{require_auth, AuthenticatedAdmin};
pub use cors::setup_cors;
