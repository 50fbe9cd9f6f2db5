//! Integration tests for sql-desk.
//!
//! These tests drive the session core and schema registry against the
//! mock backend; no network access is required.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
