//! ECS service and task management

use crate::aws::context::AwsContext;
use crate::wait::{WaitConfig, wait_for_resource};
use anyhow::{Context, Result};
use aws_sdk_ecs::Client;
use aws_sdk_ecs::types::DesiredStatus;
use tracing::debug;

/// Point-in-time view of a service, as far as stability is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSnapshot {
    /// `ACTIVE`, `DRAINING` or `INACTIVE`
    pub status: String,
    pub desired_count: i32,
    pub running_count: i32,
    /// Number of deployments (primary plus any still rolling)
    pub deployments: usize,
}

/// Decide whether a service has settled.
///
/// Stable means a single deployment with running == desired. A service that
/// is missing or no longer active will never settle, so that is an error.
pub fn is_service_stable(service: &str, snapshot: Option<&ServiceSnapshot>) -> Result<bool> {
    let Some(snapshot) = snapshot else {
        anyhow::bail!("Service {service} is MISSING");
    };

    if snapshot.status == "INACTIVE" || snapshot.status == "DRAINING" {
        anyhow::bail!("Service {service} is {}", snapshot.status);
    }

    Ok(snapshot.deployments == 1 && snapshot.running_count == snapshot.desired_count)
}

/// Trait for ECS operations that can be mocked in tests.
///
/// This trait abstracts the ECS client operations to enable unit testing
/// of the teardown sequence without hitting real AWS.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait EcsOperations: Send + Sync {
    /// List the ARNs of every service in a cluster
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>>;

    /// Set a service's desired task count
    async fn update_desired_count(&self, cluster: &str, service: &str, count: i32) -> Result<()>;

    /// Block until a service is stable or the wait budget runs out
    async fn wait_until_stable(
        &self,
        cluster: &str,
        service: &str,
        config: &WaitConfig,
    ) -> Result<()>;

    /// Delete a service even if it still has tasks
    async fn force_delete_service(&self, cluster: &str, service: &str) -> Result<()>;

    /// List the ARNs of tasks whose desired status is RUNNING
    async fn list_running_tasks(&self, cluster: &str) -> Result<Vec<String>>;

    /// Stop a task with the given reason
    async fn stop_task(&self, cluster: &str, task: &str, reason: &str) -> Result<()>;
}

/// ECS client for draining clusters
pub struct EcsClient {
    pub(crate) client: Client,
}

impl EcsClient {
    /// Create an ECS client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ecs_client(),
        }
    }

    /// List the ARNs of every service in `cluster`, following every page
    pub async fn list_services(&self, cluster: &str) -> Result<Vec<String>> {
        let mut pages = self
            .client
            .list_services()
            .cluster(cluster)
            .into_paginator()
            .items()
            .send();

        let mut arns = Vec::new();
        while let Some(arn) = pages.next().await {
            arns.push(arn.context("ListServices failed")?);
        }
        Ok(arns)
    }

    /// Set the desired count of a service
    pub async fn update_desired_count(
        &self,
        cluster: &str,
        service: &str,
        count: i32,
    ) -> Result<()> {
        self.client
            .update_service()
            .cluster(cluster)
            .service(service)
            .desired_count(count)
            .send()
            .await
            .with_context(|| format!("UpdateService failed for {service}"))?;
        Ok(())
    }

    /// Fetch the current stability-relevant state of one service.
    ///
    /// Returns `None` when ECS reports the service as missing.
    pub async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ServiceSnapshot>> {
        let response = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .with_context(|| format!("DescribeServices failed for {service}"))?;

        if let Some(failure) = response.failures().first() {
            debug!(
                service = %service,
                reason = ?failure.reason(),
                "DescribeServices reported a failure"
            );
        }

        Ok(response.services().first().map(|s| ServiceSnapshot {
            status: s.status().unwrap_or_default().to_string(),
            desired_count: s.desired_count(),
            running_count: s.running_count(),
            deployments: s.deployments().len(),
        }))
    }

    /// Poll `DescribeServices` until the service is stable
    pub async fn wait_until_stable(
        &self,
        cluster: &str,
        service: &str,
        config: &WaitConfig,
    ) -> Result<()> {
        wait_for_resource(
            config,
            move || async move {
                let snapshot = self.describe_service(cluster, service).await?;
                is_service_stable(service, snapshot.as_ref())
            },
            service,
        )
        .await
    }

    /// Delete a service with `force = true`
    pub async fn force_delete_service(&self, cluster: &str, service: &str) -> Result<()> {
        self.client
            .delete_service()
            .cluster(cluster)
            .service(service)
            .force(true)
            .send()
            .await
            .with_context(|| format!("DeleteService failed for {service}"))?;
        Ok(())
    }

    /// List the ARNs of tasks with desired status RUNNING, following every page
    pub async fn list_running_tasks(&self, cluster: &str) -> Result<Vec<String>> {
        let mut pages = self
            .client
            .list_tasks()
            .cluster(cluster)
            .desired_status(DesiredStatus::Running)
            .into_paginator()
            .items()
            .send();

        let mut arns = Vec::new();
        while let Some(arn) = pages.next().await {
            arns.push(arn.context("ListTasks failed")?);
        }
        Ok(arns)
    }

    /// Stop a single task
    pub async fn stop_task(&self, cluster: &str, task: &str, reason: &str) -> Result<()> {
        self.client
            .stop_task()
            .cluster(cluster)
            .task(task)
            .reason(reason)
            .send()
            .await
            .with_context(|| format!("StopTask failed for {task}"))?;
        Ok(())
    }
}

impl EcsOperations for EcsClient {
    async fn list_services(&self, cluster: &str) -> Result<Vec<String>> {
        EcsClient::list_services(self, cluster).await
    }

    async fn update_desired_count(&self, cluster: &str, service: &str, count: i32) -> Result<()> {
        EcsClient::update_desired_count(self, cluster, service, count).await
    }

    async fn wait_until_stable(
        &self,
        cluster: &str,
        service: &str,
        config: &WaitConfig,
    ) -> Result<()> {
        EcsClient::wait_until_stable(self, cluster, service, config).await
    }

    async fn force_delete_service(&self, cluster: &str, service: &str) -> Result<()> {
        EcsClient::force_delete_service(self, cluster, service).await
    }

    async fn list_running_tasks(&self, cluster: &str) -> Result<Vec<String>> {
        EcsClient::list_running_tasks(self, cluster).await
    }

    async fn stop_task(&self, cluster: &str, task: &str, reason: &str) -> Result<()> {
        EcsClient::stop_task(self, cluster, task, reason).await
    }
}
