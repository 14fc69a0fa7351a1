//! Keyloom engine
//!
//! Turns collection schema snapshots into autocomplete key suggestions and
//! manages a locally persisted catalog of saved filter expressions.

pub mod config;
pub mod filters;
pub mod keygen;
pub mod suggest;

pub use filters::{FileBackend, FilterBackend, SavedFilter, SavedFilterStore};
pub use keygen::{KeyGenerator, SchemaKeyGenerator};
pub use suggest::{BlockingSuggestClient, MAX_KEYS, SuggestHandle, SuggestWorker};
