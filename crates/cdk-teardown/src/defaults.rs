//! Default configuration values
//!
//! Shared between the CLI definition and the library so both agree on what
//! an omitted flag means.

use std::time::Duration;

/// CloudFormation resource type of an ECS cluster
pub const CLUSTER_RESOURCE_TYPE: &str = "AWS::ECS::Cluster";

/// Reason attached to every StopTask call
pub const STOP_TASK_REASON: &str = "Cleanup before destroy";

/// Default CDK executable
pub const DEFAULT_CDK_BIN: &str = "cdk";

/// Default CDK project directory
pub const DEFAULT_CDK_APP_DIR: &str = ".";

/// Default CDK app entry file, relative to the project directory
pub const DEFAULT_CDK_APP_FILE: &str = "app.ts";

/// Maximum time to wait for a single service to become stable (10 minutes)
pub const SERVICE_STABLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Polling interval while waiting for a service to become stable
pub const SERVICE_STABLE_POLL_INTERVAL: Duration = Duration::from_secs(15);
