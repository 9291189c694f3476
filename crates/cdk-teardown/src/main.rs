//! cdk-teardown: drain ECS services and tasks, then run `cdk destroy`
//!
//! `cdk destroy` tends to fail or hang on ECS services that still have
//! running tasks. This tool scales them down and removes them first.

use anyhow::Result;
use cdk_teardown::aws::classify_anyhow_error;
use cdk_teardown::config::{self, AwsConfig, DestroyConfig, RunConfig};
use cdk_teardown::defaults::{DEFAULT_CDK_APP_DIR, DEFAULT_CDK_APP_FILE, DEFAULT_CDK_BIN};
use cdk_teardown::orchestrator;
use cdk_teardown::wait::WaitConfig;
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cdk-teardown")]
#[command(about = "Drain ECS services and tasks of a stack, then run cdk destroy")]
#[command(version)]
struct Args {
    /// CloudFormation stack name to clean up before destroy
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    stack: String,

    /// AWS profile for API calls and for cdk destroy
    #[arg(long)]
    profile: Option<String>,

    /// AWS region (default: resolved from environment/profile)
    #[arg(long)]
    region: Option<String>,

    /// Root directory of the CDK app; cdk destroy runs here
    #[arg(long, visible_alias = "cdk-app-root", default_value = DEFAULT_CDK_APP_DIR)]
    cdk_app_dir: PathBuf,

    /// CDK app entry file, absolute or relative to --cdk-app-dir
    #[arg(long, visible_alias = "cdk-app-path", default_value = DEFAULT_CDK_APP_FILE)]
    cdk_app_file: PathBuf,

    /// CDK executable to invoke
    #[arg(long, default_value = DEFAULT_CDK_BIN)]
    cdk_bin: String,

    /// Show what would be scaled, deleted, stopped and run without doing it
    #[arg(long)]
    dry_run: bool,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        let profile = config::non_empty(args.profile);
        Self {
            stack_name: args.stack,
            aws: AwsConfig {
                region: config::non_empty(args.region),
                profile: profile.clone(),
            },
            destroy: DestroyConfig {
                cdk_bin: args.cdk_bin,
                app_dir: args.cdk_app_dir,
                app_file: args.cdk_app_file,
                profile,
            },
            stability_wait: WaitConfig::services_stable(),
            dry_run: args.dry_run,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if let Some(hint) = classify_anyhow_error(e).suggestion() {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

fn init_tracing() -> Result<()> {
    // AWS SDK crates are chatty at info; keep them to warnings
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into())
        .add_directive("aws_config=warn".parse()?)
        .add_directive("aws_smithy_runtime=warn".parse()?)
        .add_directive("aws_sdk_ecs=warn".parse()?)
        .add_directive("aws_sdk_cloudformation=warn".parse()?);

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let config: RunConfig = args.into();
    orchestrator::run_teardown(config).await
}
