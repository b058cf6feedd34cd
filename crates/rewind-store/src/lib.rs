//! # Rewind Store
//!
//! Durable session storage: an append-only SQLite action log per recording
//! session, and the flattened AI-ready export built from it.

mod export;
mod schema;
mod store;

pub use export::{ExportStep, SessionExport};
pub use store::SessionStore;
