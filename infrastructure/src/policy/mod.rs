//! Policy document ingestion

mod ingest;

pub use ingest::{IngestError, IngestReport, PolicyIngestor};
