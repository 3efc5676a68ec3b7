#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Orbit schema model
//!
//! This crate defines the canonical, versioned description of the wallet API:
//! type definitions with validation contracts, endpoint definitions with their
//! example pair, and helper definitions. A [`SchemaSnapshot`] is loaded once,
//! frozen behind an `Arc`, and every downstream artifact is derived from it.

pub mod contract;
pub mod definitions;
pub mod error;
pub mod snapshot;
pub mod value;

pub use contract::Contract;
pub use definitions::*;
pub use error::{ContractViolation, Result, SchemaError};
pub use snapshot::{FrozenSnapshot, SchemaSnapshot};
pub use value::Value;
