// ABOUTME: Helper module exports for integration tests
// ABOUTME: Re-exports the Axum request/response test utilities

pub mod axum_test;
