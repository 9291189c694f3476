//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating the CloudFormation and ECS clients from the same config.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;
use tracing::debug;

/// Shared AWS configuration context for creating service clients.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::load(Some("us-east-1"), Some("prod")).await?;
///
/// let stacks = CloudFormationClient::from_context(&aws);
/// let ecs = EcsClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
}

impl AwsContext {
    /// Load AWS configuration, optionally pinning the region and profile.
    ///
    /// Without an explicit region the SDK's provider chain decides
    /// (`AWS_REGION`, the profile's `region` setting, IMDS). Fails if no
    /// region can be resolved at all.
    pub async fn load(region: Option<&str>, profile: Option<&str>) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        let region = config
            .region()
            .map(|r| r.to_string())
            .context("No AWS region configured - pass --region or set AWS_REGION")?;

        debug!(region = %region, profile = ?profile, "Loaded AWS configuration");

        Ok(Self {
            config: Arc::new(config),
            region,
        })
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the resolved region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Create a CloudFormation client from this context.
    pub fn cloudformation_client(&self) -> aws_sdk_cloudformation::Client {
        aws_sdk_cloudformation::Client::new(self.sdk_config())
    }

    /// Create an ECS client from this context.
    pub fn ecs_client(&self) -> aws_sdk_ecs::Client {
        aws_sdk_ecs::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Loading never talks to AWS, but it does read ~/.aws and env vars, so an
    // explicit region keeps the result independent of the machine.

    #[tokio::test]
    async fn explicit_region_wins() {
        let ctx = AwsContext::load(Some("eu-west-1"), None).await.unwrap();
        assert_eq!(ctx.region(), "eu-west-1");
    }

    #[tokio::test]
    async fn clone_shares_config() {
        let ctx1 = AwsContext::load(Some("us-east-2"), None).await.unwrap();
        let ctx2 = ctx1.clone();

        assert_eq!(ctx1.region(), ctx2.region());
        assert!(Arc::ptr_eq(&ctx1.config, &ctx2.config));
    }

    #[tokio::test]
    async fn debug_hides_credentials() {
        let ctx = AwsContext::load(Some("us-west-2"), None).await.unwrap();
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("us-west-2"));
        assert!(!rendered.contains("config"));
    }
}
