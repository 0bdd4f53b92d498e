// ABOUTME: Main library entry point for the course archive backend
// ABOUTME: Provides REST API for admin authentication, course CRUD, and statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Course Archive Server
//!
//! A single-tenant administrative REST backend for archiving municipal
//! training-course records. One shared admin credential guards the whole
//! API: login issues a time-bounded bearer token, every protected route
//! verifies it, and credential rotation is gated behind both the current
//! password and a deployment-level rotation key.
//!
//! ## Architecture
//!
//! - **Auth**: JWT issuance and verification (`auth`), bearer middleware
//!   (`middleware`), and the login/rotation handlers (`routes::auth`)
//! - **Database**: SQLite-backed credential and course storage (`database`)
//! - **Routes**: course CRUD and statistics aggregation handlers
//! - **Config**: environment-driven server configuration (`config`)
//!
//! ## Quick Start
//!
//! 1. Seed the admin credential with the `seed-admin` binary
//! 2. Export `JWT_SECRET` and `PASSWORD_CHANGE_KEY`
//! 3. Start the API with `course-archive-server`

/// JWT-based session token issuance and verification
pub mod auth;

/// Environment-based configuration management
pub mod config;

/// SQLite storage for the admin credential and course records
pub mod database;

/// Unified error handling and HTTP error responses
pub mod errors;

/// Structured logging configuration
pub mod logging;

/// Request middleware (bearer-token gate, CORS)
pub mod middleware;

/// Domain models for credentials and courses
pub mod models;

/// HTTP route handlers organized by domain
pub mod routes;
