//! Storage traits and implementations
//!
//! The sync engine only needs per-key string reads and writes. The
//! trait-based design allows swapping between in-memory and persistent
//! storage implementations.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemorySettingsStore;
pub use sqlite::SqliteSettingsStore;
pub use traits::{CursorStore, SettingsStore, register_target};
