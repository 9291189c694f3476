//! cdk-teardown - drain ECS compute before `cdk destroy`
//!
//! CloudFormation refuses to delete (or waits a very long time on) ECS
//! services that still have running tasks. This crate scales every service in
//! the stack's cluster to zero, deletes it, stops leftover tasks and then hands
//! over to `cdk destroy`.

pub mod arn;
pub mod aws;
pub mod config;
pub mod defaults;
pub mod destroy;
pub mod orchestrator;
pub mod wait;
