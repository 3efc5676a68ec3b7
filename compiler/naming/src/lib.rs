#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Type Mapper and Naming Transformer
//!
//! Every identifier and type token that appears in generated source goes
//! through this crate. Both layers are deterministic; [`map_name`] is also
//! idempotent and always yields a valid identifier for the profile's target.

pub mod case;
pub mod mapper;

pub use case::{is_valid_identifier, map_name, tokenize};
pub use mapper::{MappingError, TypeMapper};
