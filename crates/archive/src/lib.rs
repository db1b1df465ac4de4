//! Student archive storage backends for MathDesk.

pub mod file_store;
pub mod in_memory;

pub use file_store::{CorruptPolicy, JsonFileStore};
pub use in_memory::InMemoryStore;
