//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB file for the durable KeyValueStore
//! - A HashMap behind an async lock for the volatile KeyValueStore

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbStore;
pub use self::memory::MemoryStore;
