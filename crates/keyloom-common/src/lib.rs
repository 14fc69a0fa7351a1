//! Common library for Keyloom
//!
//! This crate provides the types shared by the suggestion engine and the
//! tools built on top of it.
//!
//! Modules:
//! * `error`: Defines error types and handling.
//! * `protocol`: Defines the messages exchanged with the suggestion worker.
//! * `schema`: Defines the collection schema model.

pub mod error;
pub mod protocol;
pub mod schema;

// Re-export commonly used types at the base
pub use error::*;
pub use protocol::{SuggestRequest, SuggestResponse};
pub use schema::{Collection, CollectionKind, Field, FieldType, Snapshot};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
