//! Teardown orchestration
//!
//! Stages run strictly in order:
//! 1. find the ECS cluster declared in the stack
//! 2. drain its services ([`services`])
//! 3. stop leftover tasks ([`tasks`])
//! 4. run `cdk destroy` ([`crate::destroy`])
//!
//! Stages 2 and 3 are skipped when the stack has no cluster.

mod services;
mod tasks;

pub use services::drain_services;
pub use tasks::stop_running_tasks;

use anyhow::{Context, Result};
use tracing::info;

use crate::aws::cloudformation::find_stack_cluster;
use crate::aws::{AwsContext, CloudFormationClient, EcsClient, EcsOperations, StackOperations};
use crate::config::RunConfig;
use crate::destroy::DestroyCommand;

/// Clear ECS compute out of the stack's cluster (stages 1-3).
///
/// Returns the cluster that was drained, or `None` if the stack has none.
pub async fn prepare_stack<S, E>(
    stacks: &S,
    ecs: &E,
    config: &RunConfig,
) -> Result<Option<String>>
where
    S: StackOperations,
    E: EcsOperations,
{
    let Some(cluster) = find_stack_cluster(stacks, &config.stack_name).await? else {
        info!(stack = %config.stack_name, "No ECS cluster in stack, nothing to drain");
        return Ok(None);
    };

    info!(stack = %config.stack_name, cluster = %cluster, "Detected ECS cluster");

    drain_services(ecs, &cluster, &config.stability_wait, config.dry_run).await?;
    stop_running_tasks(ecs, &cluster, config.dry_run).await?;

    Ok(Some(cluster))
}

/// Run stages 1-4: clear the cluster, then `cdk destroy`.
///
/// In dry-run mode the destroy command is logged instead of run.
pub async fn execute<S, E>(stacks: &S, ecs: &E, config: &RunConfig) -> Result<()>
where
    S: StackOperations,
    E: EcsOperations,
{
    prepare_stack(stacks, ecs, config).await?;

    let destroy = DestroyCommand::from_config(&config.destroy);
    if config.dry_run {
        info!(
            command = %destroy.display(),
            dir = %destroy.working_dir.display(),
            "[DRY RUN] Would run cdk destroy"
        );
        return Ok(());
    }

    destroy.run().await.context("cdk destroy failed")?;

    info!(stack = %config.stack_name, "All done");
    Ok(())
}

/// Run the full teardown against real AWS.
pub async fn run_teardown(config: RunConfig) -> Result<()> {
    let aws = AwsContext::load(config.region(), config.profile())
        .await
        .context("Failed to load AWS configuration")?;

    info!(
        stack = %config.stack_name,
        region = %aws.region(),
        profile = ?config.profile(),
        dry_run = config.dry_run,
        "Starting teardown"
    );

    let stacks = CloudFormationClient::from_context(&aws);
    let ecs = EcsClient::from_context(&aws);
    execute(&stacks, &ecs, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::StackResource;
    use crate::aws::cloudformation::MockStackOperations;
    use crate::aws::ecs::MockEcsOperations;
    use crate::config::{AwsConfig, DestroyConfig};
    use crate::wait::WaitConfig;
    use mockall::Sequence;
    use std::path::{Path, PathBuf};

    fn config(dry_run: bool) -> RunConfig {
        config_in(Path::new("."), "cdk", dry_run)
    }

    fn config_in(app_dir: &Path, cdk_bin: &str, dry_run: bool) -> RunConfig {
        RunConfig {
            stack_name: "app-stack".to_string(),
            aws: AwsConfig::default(),
            destroy: DestroyConfig {
                cdk_bin: cdk_bin.to_string(),
                app_dir: app_dir.to_path_buf(),
                app_file: PathBuf::from("app.ts"),
                profile: None,
            },
            stability_wait: WaitConfig::services_stable(),
            dry_run,
        }
    }

    /// App dir where `sh destroy ...` records its arguments in `ran`.
    ///
    /// With `cdk_bin = "sh"` the `destroy` argument names this script.
    #[cfg(unix)]
    fn recording_app_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("destroy"), "echo \"$@\" > ran\n").unwrap();
        dir
    }

    fn stack_with(resources: Vec<StackResource>) -> MockStackOperations {
        let mut stacks = MockStackOperations::new();
        stacks
            .expect_list_stack_resources()
            .times(1)
            .returning(move |_| Ok(resources.clone()));
        stacks
    }

    #[tokio::test]
    async fn stack_without_cluster_skips_ecs_entirely() {
        let stacks = stack_with(vec![StackResource::new("AWS::S3::Bucket", "assets")]);
        // No expectations: any ECS call panics
        let ecs = MockEcsOperations::new();

        let cluster = prepare_stack(&stacks, &ecs, &config(false)).await.unwrap();
        assert_eq!(cluster, None);
    }

    #[tokio::test]
    async fn services_are_drained_before_tasks_are_stopped() {
        let stacks = stack_with(vec![
            StackResource::new("AWS::IAM::Role", "task-role"),
            StackResource::new("AWS::ECS::Cluster", "app-cluster"),
        ]);

        let mut ecs = MockEcsOperations::new();
        let mut seq = Sequence::new();
        ecs.expect_list_services()
            .withf(|c| c == "app-cluster")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));
        ecs.expect_list_running_tasks()
            .withf(|c| c == "app-cluster")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));

        let cluster = prepare_stack(&stacks, &ecs, &config(false)).await.unwrap();
        assert_eq!(cluster.as_deref(), Some("app-cluster"));
    }

    #[tokio::test]
    async fn stack_listing_failure_aborts_before_ecs() {
        let mut stacks = MockStackOperations::new();
        stacks
            .expect_list_stack_resources()
            .returning(|_| Err(anyhow::anyhow!("AccessDenied")));
        let ecs = MockEcsOperations::new();

        assert!(prepare_stack(&stacks, &ecs, &config(false)).await.is_err());
    }

    #[tokio::test]
    async fn service_listing_failure_skips_task_stage() {
        let stacks = stack_with(vec![StackResource::new("AWS::ECS::Cluster", "app-cluster")]);
        let mut ecs = MockEcsOperations::new();
        ecs.expect_list_services()
            .returning(|_| Err(anyhow::anyhow!("ClusterNotFoundException")));
        ecs.expect_list_running_tasks().never();

        let err = prepare_stack(&stacks, &ecs, &config(false))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to list services"));
    }

    #[tokio::test]
    async fn dry_run_lists_without_mutating() {
        let stacks = stack_with(vec![StackResource::new("AWS::ECS::Cluster", "app-cluster")]);
        let mut ecs = MockEcsOperations::new();
        ecs.expect_list_services()
            .returning(|_| Ok(vec!["arn:aws:ecs:::service/app-cluster/web".to_string()]));
        ecs.expect_list_running_tasks()
            .returning(|_| Ok(vec!["arn:aws:ecs:::task/app-cluster/abc".to_string()]));
        ecs.expect_update_desired_count().never();
        ecs.expect_force_delete_service().never();
        ecs.expect_stop_task().never();

        prepare_stack(&stacks, &ecs, &config(true)).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stack_without_cluster_still_runs_destroy() {
        let dir = recording_app_dir();
        let stacks = stack_with(vec![StackResource::new("AWS::S3::Bucket", "assets")]);
        let ecs = MockEcsOperations::new();

        execute(&stacks, &ecs, &config_in(dir.path(), "sh", false))
            .await
            .unwrap();

        let args = std::fs::read_to_string(dir.path().join("ran")).unwrap();
        assert_eq!(args.trim(), "--all --force --app npx ts-node app.ts");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn destroy_runs_after_cluster_is_cleared() {
        let dir = recording_app_dir();
        let stacks = stack_with(vec![StackResource::new("AWS::ECS::Cluster", "app-cluster")]);
        let mut ecs = MockEcsOperations::new();
        ecs.expect_list_services().times(1).returning(|_| Ok(vec![]));
        ecs.expect_list_running_tasks()
            .times(1)
            .returning(|_| Ok(vec![]));

        execute(&stacks, &ecs, &config_in(dir.path(), "sh", false))
            .await
            .unwrap();

        assert!(dir.path().join("ran").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_destroy_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let stacks = stack_with(vec![]);
        let ecs = MockEcsOperations::new();

        let err = execute(&stacks, &ecs, &config_in(dir.path(), "false", false))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cdk destroy failed"), "{err:?}");
        assert!(
            err.chain()
                .any(|c| matches!(
                    c.downcast_ref::<crate::destroy::DestroyError>(),
                    Some(crate::destroy::DestroyError::NonZeroExit { code: 1, .. })
                )),
            "{err:?}"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stack_listing_failure_never_spawns_destroy() {
        let dir = recording_app_dir();
        let mut stacks = MockStackOperations::new();
        stacks
            .expect_list_stack_resources()
            .returning(|_| Err(anyhow::anyhow!("ValidationError")));
        let ecs = MockEcsOperations::new();

        let result = execute(&stacks, &ecs, &config_in(dir.path(), "sh", false)).await;

        assert!(result.is_err());
        assert!(!dir.path().join("ran").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dry_run_never_spawns_destroy() {
        let dir = recording_app_dir();
        let stacks = stack_with(vec![StackResource::new("AWS::ECS::Cluster", "app-cluster")]);
        let mut ecs = MockEcsOperations::new();
        ecs.expect_list_services().returning(|_| Ok(vec![]));
        ecs.expect_list_running_tasks().returning(|_| Ok(vec![]));

        execute(&stacks, &ecs, &config_in(dir.path(), "sh", true))
            .await
            .unwrap();

        assert!(!dir.path().join("ran").exists());
    }
}
