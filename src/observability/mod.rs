//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (address, tx_hash, chain_id)
//!     → logging.rs subscriber (pretty or JSON, on stderr)
//!
//! User-facing progress lines are printed by `report`, not logged.
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Secret keys never appear in any event

pub mod logging;

pub use logging::init_logging;
