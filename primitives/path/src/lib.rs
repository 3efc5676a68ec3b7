// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Path utility functions for finding project roots and resolving paths.
//!
//! This module provides utilities for finding the workspace root, validating input paths,
//! locating the shipped schema snapshots and laying out generated artifacts.

pub mod path_utils;

// Re-export for convenience
pub use path_utils::*;
