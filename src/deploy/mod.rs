//! Deployment subsystem.
//!
//! # Data Flow
//! ```text
//! artifact JSON + constructor values
//!     → artifact.rs (load bytecode/ABI, encode arguments)
//!     → DeploymentRequest
//!     → deployer.rs (signer check, broadcast, confirmation)
//!     → DeploymentResult (canonical address)
//! ```

pub mod artifact;
pub mod deployer;
pub mod types;

pub use artifact::{ArtifactError, ContractArtifact};
pub use deployer::{resolve_signer, Deployer};
pub use types::{ConstructorArgs, DeploymentRequest, DeploymentResult};
