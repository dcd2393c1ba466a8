//! Adapters for the storage and navigation ports.

pub mod memory;
pub mod navigation;
pub mod sqlite;

pub use memory::InMemoryKeyValueStore;
pub use navigation::BroadcastNavigation;
pub use sqlite::SqliteKeyValueStore;
