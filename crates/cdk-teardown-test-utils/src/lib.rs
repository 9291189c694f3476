//! Shared test utilities for cdk-teardown
//!
//! ## Modules
//!
//! - [`aws`]: region, profile and target stack discovery for integration tests

pub mod aws;

pub use aws::{get_test_profile, get_test_region, get_test_stack};
