//! Service draining: scale to zero, wait, force-delete

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::arn::short_name;
use crate::aws::{EcsOperations, error_code};
use crate::wait::WaitConfig;

/// Scale every service in `cluster` to zero and delete it, one at a time.
///
/// Only the initial listing can fail the call. A failed scale-down skips that
/// service's wait and delete; a failed or timed-out wait still proceeds to the
/// delete; a failed delete moves on to the next service.
pub async fn drain_services<E: EcsOperations>(
    ecs: &E,
    cluster: &str,
    wait: &WaitConfig,
    dry_run: bool,
) -> Result<()> {
    let services = ecs
        .list_services(cluster)
        .await
        .with_context(|| format!("Failed to list services in cluster {cluster}"))?;

    if services.is_empty() {
        info!(cluster = %cluster, "No ECS services found in cluster");
        return Ok(());
    }

    info!(cluster = %cluster, count = services.len(), "Draining ECS services");

    for arn in &services {
        let service = short_name(arn);

        if dry_run {
            info!(service = %service, "[DRY RUN] Would scale to 0 and delete");
            continue;
        }

        info!(service = %service, "Setting desired count to 0");
        if let Err(e) = ecs.update_desired_count(cluster, service, 0).await {
            warn!(
                service = %service,
                code = %error_code(&e),
                error = ?e,
                "Failed to scale service down, skipping"
            );
            continue;
        }

        info!(
            service = %service,
            timeout_secs = wait.timeout.as_secs(),
            "Waiting for service to stabilize"
        );
        if let Err(e) = ecs.wait_until_stable(cluster, service, wait).await {
            warn!(
                service = %service,
                error = ?e,
                "Service did not stabilize, deleting anyway"
            );
        }

        info!(service = %service, "Deleting service");
        match ecs.force_delete_service(cluster, service).await {
            Ok(()) => info!(service = %service, "Deleted"),
            Err(e) => warn!(
                service = %service,
                code = %error_code(&e),
                error = ?e,
                "Failed to delete service"
            ),
        }
    }

    Ok(())
}
