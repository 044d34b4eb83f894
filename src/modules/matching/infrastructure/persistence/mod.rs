mod in_memory_store;
mod sqlite_store;

pub use in_memory_store::InMemoryMatchStore;
pub use sqlite_store::SqliteMatchStore;
