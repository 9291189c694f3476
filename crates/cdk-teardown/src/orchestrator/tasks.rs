//! Stop tasks still running after the services are gone

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::arn::short_name;
use crate::aws::{EcsOperations, error_code};
use crate::defaults::STOP_TASK_REASON;

/// Stop every task in `cluster` whose desired status is RUNNING.
///
/// Listing failures are returned; individual stop failures are logged.
pub async fn stop_running_tasks<E: EcsOperations>(
    ecs: &E,
    cluster: &str,
    dry_run: bool,
) -> Result<()> {
    let tasks = ecs
        .list_running_tasks(cluster)
        .await
        .with_context(|| format!("Failed to list running tasks in cluster {cluster}"))?;

    if tasks.is_empty() {
        info!(cluster = %cluster, "No running tasks found in cluster");
        return Ok(());
    }

    for arn in &tasks {
        let task = short_name(arn);

        if dry_run {
            info!(task = %task, "[DRY RUN] Would stop");
            continue;
        }

        info!(task = %task, "Stopping task");
        if let Err(e) = ecs.stop_task(cluster, arn, STOP_TASK_REASON).await {
            warn!(
                task = %task,
                code = %error_code(&e),
                error = ?e,
                "Failed to stop task"
            );
        }
    }

    Ok(())
}
