//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! deploy.toml (or built-in defaults)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DeployConfig (validated, immutable)
//!     → resolve_network + signer key from env
//!     → DeploymentPlan handed to the runner
//! ```
//!
//! # Design Decisions
//! - Config is loaded once per run and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The signer key only ever comes from the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, resolve_network, ConfigError};
pub use schema::{
    ChainConfig, DeployConfig, DeploymentConfig, LogFormat, LoggingConfig, NetworkConfig,
    VerificationConfig,
};
pub use validation::ValidationError;
