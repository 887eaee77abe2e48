//! Database layer
//!
//! SQLite-backed storage for the five content collections. All data access
//! goes through the repository traits in [`repositories`], which form the
//! narrow seam behind which the storage backend can be swapped.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
