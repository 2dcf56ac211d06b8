//! Policy domain
//!
//! Policy documents are split into overlapping chunks for similarity search;
//! routing consumes the ranked [`PolicyMatch`] results.

pub mod chunker;
pub mod entities;

pub use chunker::{ChunkerConfig, chunk_policy, chunk_policy_with};
pub use entities::{PolicyChunk, PolicyMatch};
