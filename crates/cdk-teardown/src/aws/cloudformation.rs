//! CloudFormation stack inspection

use crate::aws::context::AwsContext;
use crate::defaults::CLUSTER_RESOURCE_TYPE;
use anyhow::{Context, Result};
use aws_sdk_cloudformation::Client;
use tracing::debug;

/// One resource declared in a stack, reduced to what the teardown needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResource {
    /// CloudFormation type, e.g. `AWS::ECS::Cluster`
    pub resource_type: String,
    /// Physical ID; absent while the resource is still being created
    pub physical_id: Option<String>,
}

impl StackResource {
    pub fn new(resource_type: impl Into<String>, physical_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            physical_id: Some(physical_id.into()),
        }
    }
}

/// Trait for stack operations that can be mocked in tests.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait StackOperations: Send + Sync {
    /// List every resource of a stack, in the order CloudFormation returns them
    async fn list_stack_resources(&self, stack_name: &str) -> Result<Vec<StackResource>>;
}

/// Physical ID of the first ECS cluster in `resources`, if any.
///
/// A cluster entry without a physical ID (or with an empty one) counts as no
/// cluster.
pub fn find_cluster(resources: &[StackResource]) -> Option<String> {
    resources
        .iter()
        .find(|r| r.resource_type == CLUSTER_RESOURCE_TYPE)
        .and_then(|r| r.physical_id.clone())
        .filter(|id| !id.is_empty())
}

/// Resolve the ECS cluster declared in `stack_name`.
///
/// Returns `Ok(None)` when the stack has no cluster; listing failures are errors.
pub async fn find_stack_cluster<S: StackOperations>(
    stacks: &S,
    stack_name: &str,
) -> Result<Option<String>> {
    let resources = stacks
        .list_stack_resources(stack_name)
        .await
        .with_context(|| format!("Failed to list resources of stack {stack_name}"))?;

    debug!(stack = %stack_name, count = resources.len(), "Listed stack resources");

    Ok(find_cluster(&resources))
}

/// CloudFormation client for reading stack resources
pub struct CloudFormationClient {
    pub(crate) client: Client,
}

impl CloudFormationClient {
    /// Create a CloudFormation client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudformation_client(),
        }
    }

    /// List all resource summaries of a stack, following every page
    pub async fn list_stack_resources(&self, stack_name: &str) -> Result<Vec<StackResource>> {
        let mut pages = self
            .client
            .list_stack_resources()
            .stack_name(stack_name)
            .into_paginator()
            .items()
            .send();

        let mut resources = Vec::new();
        while let Some(summary) = pages.next().await {
            let summary = summary.context("ListStackResources failed")?;
            resources.push(StackResource {
                resource_type: summary.resource_type().unwrap_or_default().to_string(),
                physical_id: summary.physical_resource_id().map(str::to_string),
            });
        }

        Ok(resources)
    }
}

impl StackOperations for CloudFormationClient {
    async fn list_stack_resources(&self, stack_name: &str) -> Result<Vec<StackResource>> {
        CloudFormationClient::list_stack_resources(self, stack_name).await
    }
}
