//! Storage Adapters
//!
//! Implementations of the FlagStore port for flags that outlive a run.
//!
//! ## Available Adapters
//!
//! - **FileFlagStore** - Stores flags as a JSON object on disk
//! - **InMemoryFlagStore** - Stores flags in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileFlagStore, InMemoryFlagStore};
//!
//! // Production: file-based storage
//! let flags = FileFlagStore::new("./data/flags.json");
//!
//! // Testing: in-memory storage
//! let flags = InMemoryFlagStore::new();
//! ```

mod file_flag_store;
mod in_memory_flag_store;

pub use file_flag_store::FileFlagStore;
pub use in_memory_flag_store::InMemoryFlagStore;
