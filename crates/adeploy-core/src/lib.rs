//! # adeploy-core - Core Domain Types
//!
//! Foundation crate for the Android wireless deployer. Provides domain types,
//! error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`DeviceRecord`] - A persisted, previously-connected device
//! - [`CandidateDevice`] - A device surfaced by one discovery pass
//! - [`ConnectionState`] - Disconnected / Pairing / Connecting / Connected
//! - [`AppRecord`] - An installed third-party package on the active device
//! - [`OperationResult`] - Success flag plus human-readable message
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use adeploy_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod types;

/// Prelude for common imports used throughout all adeploy crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use types::{
    serial_for, AppRecord, CandidateDevice, ConnectionState, DeviceOrigin, DeviceRecord,
    OperationResult, DEFAULT_ADB_PORT,
};
