//! Event Store
//!
//! Process-local storage for the API server. Nothing is persisted; the
//! server may be seeded from an exported JSON file at startup.

mod error;
mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::{EventStore, StoreStats};
