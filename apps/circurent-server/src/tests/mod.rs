//! Server unit and integration tests.
//!
//! Tests are organized into modules by feature area:
//! - `common` - Shared test helpers and utilities
//! - `verification` - Code issuance, consumption and availability checks
//! - `registration` - Registration finalization tests
//! - `flow` - End-to-end registration flow tests

pub mod common;

mod registration;
