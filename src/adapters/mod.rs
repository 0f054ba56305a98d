//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - REST backend client (reqwest)
//! - `mock` - In-memory backend for tests and offline runs
//! - `enrichment` - ATECO enrichment providers
//! - `notify` - User notices (log, recording)
//! - `storage` - Flag stores (JSON file, in-memory)

pub mod enrichment;
pub mod http;
pub mod mock;
pub mod notify;
pub mod storage;

pub use enrichment::NullEnricher;
pub use http::{HttpBackendClient, HttpBackendConfig};
pub use mock::{MockBackend, MockCall, MockOperation};
pub use notify::{Notice, RecordingNotifier, TracingNotifier};
pub use storage::{FileFlagStore, InMemoryFlagStore};
