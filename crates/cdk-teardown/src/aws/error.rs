//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use thiserror::Error;

/// AWS error categories used for log output and user-facing hints
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (stack, cluster, service)
    #[error("Resource not found: {message}")]
    NotFound { code: String, message: String },

    /// Credentials lack permission for the call
    #[error("Access denied: {message}")]
    AccessDenied { code: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    Throttled { code: String, message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// The AWS error code, if one was reported
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. }
            | AwsError::AccessDenied { code, .. }
            | AwsError::Throttled { code, .. } => Some(code.as_str()),
            AwsError::Sdk { code, .. } => code.as_deref(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        self.code().and_then(suggestion_for_code)
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "ClusterNotFoundException",
    "ServiceNotFoundException",
    "ServiceNotActiveException",
];

/// Known AWS error codes for missing permissions or bad credentials
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        // CloudFormation reports a missing stack as a generic validation error
        Some(c @ "ValidationError") if message.contains("does not exist") => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled {
            code: c.to_string(),
            message,
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an error from an anyhow::Error by extracting the AWS error code.
///
/// Walks the error chain looking for the SDK errors of the operations this
/// tool issues and reads `.code()` / `.message()` through
/// `ProvideErrorMetadata`. Falls back to the Debug representation if no typed
/// error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    use aws_sdk_cloudformation::operation::list_stack_resources::ListStackResourcesError;
    use aws_sdk_ecs::error::{ProvideErrorMetadata, SdkError};
    use aws_sdk_ecs::operation::{
        delete_service::DeleteServiceError, describe_services::DescribeServicesError,
        list_services::ListServicesError, list_tasks::ListTasksError,
        stop_task::StopTaskError, update_service::UpdateServiceError,
    };

    fn meta<E: ProvideErrorMetadata>(e: &E) -> AwsError {
        classify_aws_error(e.code(), e.message())
    }

    for cause in error.chain() {
        if let Some(e) = cause
            .downcast_ref::<aws_sdk_cloudformation::error::SdkError<ListStackResourcesError>>()
        {
            return meta(e);
        }
        if let Some(e) = cause.downcast_ref::<SdkError<ListServicesError>>() {
            return meta(e);
        }
        if let Some(e) = cause.downcast_ref::<SdkError<UpdateServiceError>>() {
            return meta(e);
        }
        if let Some(e) = cause.downcast_ref::<SdkError<DescribeServicesError>>() {
            return meta(e);
        }
        if let Some(e) = cause.downcast_ref::<SdkError<DeleteServiceError>>() {
            return meta(e);
        }
        if let Some(e) = cause.downcast_ref::<SdkError<ListTasksError>>() {
            return meta(e);
        }
        if let Some(e) = cause.downcast_ref::<SdkError<StopTaskError>>() {
            return meta(e);
        }
    }

    // Fallback: extract error code from debug string representation
    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&error.to_string()));
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// AWS error code of `error` for log output, `-` when there is none
pub fn error_code(error: &anyhow::Error) -> String {
    classify_anyhow_error(error)
        .code()
        .unwrap_or("-")
        .to_string()
}

/// Extract an AWS error code from a `code: Some("...")` debug pattern
fn extract_error_code(debug_str: &str) -> Option<String> {
    let start = debug_str.find("code: Some(\"")?;
    let rest = &debug_str[start + 12..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "ValidationError",
        "Check the --stack name and that --region/--profile point at the right account.",
    ),
    (
        "ClusterNotFoundException",
        "The cluster may already have been deleted; cdk destroy can still proceed.",
    ),
    (
        "AccessDenied",
        "Check that the credentials allow cloudformation:ListStackResources and ecs:* calls.",
    ),
    (
        "AccessDeniedException",
        "Check that the credentials allow cloudformation:ListStackResources and ecs:* calls.",
    ),
    (
        "UnauthorizedOperation",
        "Check that the credentials allow cloudformation:ListStackResources and ecs:* calls.",
    ),
    (
        "ExpiredToken",
        "Credentials have expired. Refresh them (e.g. `aws sso login`) and retry.",
    ),
    (
        "ExpiredTokenException",
        "Credentials have expired. Refresh them (e.g. `aws sso login`) and retry.",
    ),
    (
        "InvalidClientTokenId",
        "The access key is not valid for this account or region.",
    ),
    ("Throttling", "AWS API rate limit hit. Wait a moment and retry."),
    (
        "ThrottlingException",
        "AWS API rate limit hit. Wait a moment and retry.",
    ),
    (
        "RequestLimitExceeded",
        "AWS API rate limit hit. Wait a moment and retry.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}
