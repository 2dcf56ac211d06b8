//! In-memory adapters for the local runtime and tests

mod store;

pub use store::InMemoryStore;
