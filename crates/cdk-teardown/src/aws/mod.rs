//! AWS client modules
//!
//! This module provides wrappers around AWS SDK clients for:
//! - CloudFormation: locating the ECS cluster declared in a stack
//! - ECS: scaling down, deleting services and stopping tasks

pub mod cloudformation;
pub mod context;
pub mod ecs;
pub mod error;

// Core clients
pub use cloudformation::{CloudFormationClient, StackOperations, StackResource};
pub use context::AwsContext;
pub use ecs::{EcsClient, EcsOperations, ServiceSnapshot};

// Error handling
pub use error::{AwsError, classify_anyhow_error, classify_aws_error, error_code};
