// ABOUTME: Configuration module organization for the course archive server
// ABOUTME: Re-exports the environment-driven server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Environment-based configuration management
pub mod environment;

pub use environment::{AuthConfig, DatabaseUrl, LogLevel, ServerConfig};
