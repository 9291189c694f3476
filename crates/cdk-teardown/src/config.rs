//! Configuration types for a teardown run

use crate::wait::WaitConfig;
use std::path::PathBuf;

/// AWS access configuration
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    /// AWS region; `None` defers to the SDK provider chain
    pub region: Option<String>,
    /// AWS profile name (overrides default credential resolution)
    pub profile: Option<String>,
}

/// How to invoke `cdk destroy`
#[derive(Debug, Clone)]
pub struct DestroyConfig {
    /// CDK executable
    pub cdk_bin: String,
    /// Directory the CDK project lives in; the child runs here
    pub app_dir: PathBuf,
    /// App entry file, absolute or relative to `app_dir`
    pub app_file: PathBuf,
    /// AWS profile passed through as `--profile`
    pub profile: Option<String>,
}

/// Configuration for a teardown run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// CloudFormation stack whose cluster gets drained
    pub stack_name: String,
    pub aws: AwsConfig,
    pub destroy: DestroyConfig,
    /// Per-service stability wait
    pub stability_wait: WaitConfig,
    /// Log intended changes without making them
    pub dry_run: bool,
}

impl RunConfig {
    pub fn region(&self) -> Option<&str> {
        self.aws.region.as_deref()
    }

    pub fn profile(&self) -> Option<&str> {
        self.aws.profile.as_deref()
    }
}

/// Normalize an optional CLI string: empty means "not given"
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
