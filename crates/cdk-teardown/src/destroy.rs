//! `cdk destroy` invocation
//!
//! The CDK CLI stays the authority on tearing the stack down; this module only
//! builds its command line and runs it with the terminal attached so its
//! progress output shows up unchanged.

use crate::config::DestroyConfig;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::info;

/// Failure of the destroy child process
#[derive(Debug, Error)]
pub enum DestroyError {
    /// The executable could not be started (not installed, bad working dir)
    #[error("Failed to spawn '{program}' in {}", dir.display())]
    Spawn {
        program: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child failed
    #[error("Failed waiting for '{program}'")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully
    #[error("'{program}' exited with status {code}")]
    NonZeroExit { program: String, code: i32 },

    /// The process was killed by a signal
    #[error("'{program}' was terminated by a signal")]
    Signaled { program: String },
}

/// A fully resolved external command: program, arguments, working directory.
///
/// Standard output and error are inherited from this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl DestroyCommand {
    /// Build `destroy --all --force [--profile P] --app "npx ts-node <file>"`.
    ///
    /// The app file is passed through as given: the child runs inside
    /// `app_dir`, so relative paths resolve against it.
    pub fn from_config(config: &DestroyConfig) -> Self {
        let mut args: Vec<String> = ["destroy", "--all", "--force"]
            .into_iter()
            .map(String::from)
            .collect();

        if let Some(profile) = config.profile.as_deref().filter(|p| !p.is_empty()) {
            args.push("--profile".to_string());
            args.push(profile.to_string());
        }

        args.push("--app".to_string());
        args.push(ts_node_app(&config.app_file));

        Self {
            program: config.cdk_bin.clone(),
            args,
            working_dir: config.app_dir.clone(),
        }
    }

    /// Shell-like rendering for logs; arguments with whitespace are double-quoted
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|arg| {
                if arg.is_empty() || arg.contains(char::is_whitespace) {
                    format!("\"{arg}\"")
                } else {
                    arg.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion with inherited stdout/stderr.
    ///
    /// Success only on a zero exit status.
    pub async fn run(&self) -> Result<(), DestroyError> {
        info!(
            command = %self.display(),
            dir = %self.working_dir.display(),
            "Running cdk destroy"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DestroyError::Spawn {
                program: self.program.clone(),
                dir: self.working_dir.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| DestroyError::Wait {
            program: self.program.clone(),
            source,
        })?;

        self.check_status(status)
    }

    fn check_status(&self, status: ExitStatus) -> Result<(), DestroyError> {
        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(DestroyError::NonZeroExit {
                program: self.program.clone(),
                code,
            }),
            None => Err(DestroyError::Signaled {
                program: self.program.clone(),
            }),
        }
    }
}

/// `--app` value: the CDK app is TypeScript, booted through ts-node
fn ts_node_app(app_file: &Path) -> String {
    format!("npx ts-node {}", app_file.display())
}
