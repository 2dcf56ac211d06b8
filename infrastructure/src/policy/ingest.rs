//! Policy ingestion for the local runtime
//!
//! Reads markdown policy documents, chunks them, embeds the chunks in
//! batches and stores them in the tenant's vector index.

use crate::memory::InMemoryStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use vetting_application::ports::embedding::{EmbeddingError, EmbeddingService};
use vetting_domain::PolicyChunk;
use vetting_domain::policy::{ChunkerConfig, chunk_policy_with};

pub const DEFAULT_EMBED_BATCH_SIZE: usize = 32;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// Outcome of one ingestion pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
}

pub struct PolicyIngestor {
    embedding: Arc<dyn EmbeddingService>,
    store: Arc<InMemoryStore>,
    chunker: ChunkerConfig,
    batch_size: usize,
}

impl PolicyIngestor {
    pub fn new(embedding: Arc<dyn EmbeddingService>, store: Arc<InMemoryStore>) -> Self {
        Self {
            embedding,
            store,
            chunker: ChunkerConfig::default(),
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    pub fn with_chunker(mut self, chunker: ChunkerConfig) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Ingest every `*.md` file directly under `dir`, in file name order.
    pub async fn ingest_dir(
        &self,
        tenant_id: &str,
        dir: &Path,
    ) -> Result<IngestReport, IngestError> {
        let io_err = |source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut report = IngestReport::default();
        for path in paths {
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| IngestError::Io {
                    path: path.clone(),
                    source,
                })?;
            let source_file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            report.chunks += self.ingest_document(tenant_id, &source_file, &text).await?;
            report.documents += 1;
        }

        info!(
            tenant = %tenant_id,
            documents = report.documents,
            chunks = report.chunks,
            "Policies ingested"
        );
        Ok(report)
    }

    /// Chunk, embed and store one document; returns the chunk count.
    pub async fn ingest_document(
        &self,
        tenant_id: &str,
        source_file: &str,
        text: &str,
    ) -> Result<usize, IngestError> {
        let chunks = chunk_policy_with(self.chunker, source_file, text);
        let mut embedded: Vec<PolicyChunk> = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedding.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                ))
                .into());
            }
            embedded.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, vector)| chunk.with_embedding(vector)),
            );
        }

        let count = embedded.len();
        debug!(source_file, chunks = count, "Policy document embedded");
        self.store.store_policy_chunks(tenant_id, embedded);
        Ok(count)
    }
}
