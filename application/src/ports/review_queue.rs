//! Review queue port
//!
//! At-least-once delivery of [`ReviewJob`]s to a worker.

use crate::error::PipelineError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use vetting_domain::ReviewJob;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueueError {
    #[error("Queue is closed")]
    Closed,

    #[error("Enqueue failed: {0}")]
    Enqueue(String),

    #[error("A worker is already attached to this queue")]
    WorkerAttached,
}

/// Processes one delivered job.
///
/// Returning a retryable [`PipelineError`] asks the queue to redeliver.
#[async_trait]
pub trait ReviewJobHandler: Send + Sync {
    async fn handle(&self, job: ReviewJob) -> Result<(), PipelineError>;
}

/// A running worker
#[async_trait]
pub trait WorkerHandle: Send + Sync {
    /// Stop taking jobs and wait for in-flight ones to finish.
    async fn close(&self);
}

#[async_trait]
pub trait ReviewQueue: Send + Sync {
    /// Returns the queue's job id.
    async fn enqueue(&self, job: ReviewJob) -> Result<String, QueueError>;

    fn create_worker(
        &self,
        handler: Arc<dyn ReviewJobHandler>,
    ) -> Result<Box<dyn WorkerHandle>, QueueError>;
}
