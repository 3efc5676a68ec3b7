// SPDX-License-Identifier: CC0-1.0

//! Orbit umbrella crate.
//!
//! This crate primarily serves as the workspace root.
//!
//! All functional code lives in the workspace member crates under
//! `primitives`, `compiler`, `backends` and `cli`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(deprecated_in_future)]
#![doc(test(attr(warn(unused))))]

/// Miscellaneous metadata about the Orbit workspace.
pub mod orbit_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Location of the canonical schema snapshot, relative to the workspace root.
    pub const CANONICAL_SCHEMA: &str = "resources/schema/circular-wallet.json";
}
