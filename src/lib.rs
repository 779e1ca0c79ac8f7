//! Deploy a contract to an EVM network and verify its source on the
//! network's block explorer.

pub mod blockchain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod observability;
pub mod report;
pub mod runner;
pub mod verify;

pub use config::DeployConfig;
pub use error::RunError;
pub use runner::{run, DeploymentPlan, PlanOverrides, RunReport};
