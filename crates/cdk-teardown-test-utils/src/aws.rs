//! AWS test utilities
//!
//! Integration tests run against a real account and need to know where to look.
//! Everything is read from the environment so nothing account-specific lands in
//! the repository.

/// Environment variable naming the stack integration tests inspect
pub const TEST_STACK_ENV: &str = "CDK_TEARDOWN_TEST_STACK";

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-1
///
/// # Example
///
/// ```
/// use cdk_teardown_test_utils::aws::get_test_region;
///
/// let region = get_test_region();
/// assert!(!region.is_empty());
/// ```
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

/// AWS profile for tests, taken from `AWS_PROFILE` when set and non-empty.
pub fn get_test_profile() -> Option<String> {
    std::env::var("AWS_PROFILE").ok().filter(|p| !p.is_empty())
}

/// Name of an existing stack to inspect, from `CDK_TEARDOWN_TEST_STACK`.
///
/// Returns `None` when unset so tests can skip instead of failing.
pub fn get_test_stack() -> Option<String> {
    std::env::var(TEST_STACK_ENV).ok().filter(|s| !s.is_empty())
}
