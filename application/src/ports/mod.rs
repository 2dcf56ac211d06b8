//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_log;
pub mod embedding;
pub mod llm_gateway;
pub mod repository;
pub mod review_queue;
