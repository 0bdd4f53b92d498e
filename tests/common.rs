// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, configuration, and app construction helpers
#![allow(dead_code)]

//! Shared test setup for the course archive integration tests.

use anyhow::Result;
use chrono::NaiveDate;
use course_archive::{
    config::environment::{AuthConfig, DatabaseUrl, LogLevel, ServerConfig},
    database::Database,
    models::NewCourse,
    routes::{router, ApiContext},
};
use axum::Router;
use std::sync::Once;

/// Password used for the seeded test admin
pub const TEST_PASSWORD: &str = "s3cret";
/// Rotation key wired into the test configuration
pub const TEST_ROTATION_KEY: &str = "ROT-KEY";

// Low bcrypt cost keeps the test suite fast; never use this in production
const TEST_BCRYPT_COST: u32 = 4;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database with migrations applied
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    database.migrate().await?;
    Ok(database)
}

/// Test configuration with both secrets present
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        log_level: LogLevel::Warn,
        database_url: DatabaseUrl::Memory,
        auth: AuthConfig {
            jwt_secret: Some("integration-test-jwt-secret".to_owned()),
            jwt_expiry_hours: 24,
            password_change_key: Some(TEST_ROTATION_KEY.to_owned()),
        },
        cors_allowed_origins: "*".to_owned(),
    }
}

/// Insert the single admin credential with [`TEST_PASSWORD`]
pub async fn seed_test_admin(database: &Database) -> Result<i64> {
    seed_admin_with_password(database, TEST_PASSWORD).await
}

/// Insert the single admin credential with an arbitrary password
pub async fn seed_admin_with_password(database: &Database, password: &str) -> Result<i64> {
    let hash = bcrypt::hash(password, TEST_BCRYPT_COST)?;
    database.insert_admin(&hash).await
}

/// Full application router over the given database, with default test config
pub fn build_test_app(database: Database) -> Router {
    build_test_app_with_config(database, &test_config())
}

/// Full application router with explicit configuration
pub fn build_test_app_with_config(database: Database, config: &ServerConfig) -> Router {
    router(ApiContext::new(database, config))
}

/// A valid course payload for create/update tests
pub fn sample_course(number: &str) -> NewCourse {
    NewCourse {
        course_number: number.to_owned(),
        course_field: "Information Technology".to_owned(),
        course_name: "Introduction to Databases".to_owned(),
        number_of_beneficiaries: 20,
        number_of_graduates: 18,
        course_hours: 40,
        course_start_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
        course_end_date: NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
        trainer_name: "Layla Hassan".to_owned(),
        trainer_phone_number: "0790000000".to_owned(),
    }
}
