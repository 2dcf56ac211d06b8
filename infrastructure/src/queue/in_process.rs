//! In-process review queue
//!
//! Jobs travel over an unbounded channel to a single dispatcher task, which
//! runs up to `concurrency` handlers at once. A handler returning a retryable
//! error gets its job redelivered after `redelivery_delay`, up to
//! `max_deliveries` deliveries in total.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use vetting_application::ports::review_queue::{
    QueueError, ReviewJobHandler, ReviewQueue, WorkerHandle,
};
use vetting_domain::ReviewJob;

#[derive(Debug, Clone, PartialEq)]
pub struct InProcessQueueConfig {
    pub concurrency: usize,
    pub max_deliveries: u32,
    pub redelivery_delay: Duration,
}

impl Default for InProcessQueueConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            max_deliveries: 3,
            redelivery_delay: Duration::from_secs(1),
        }
    }
}

impl InProcessQueueConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_deliveries(mut self, max_deliveries: u32) -> Self {
        self.max_deliveries = max_deliveries.max(1);
        self
    }

    pub fn with_redelivery_delay(mut self, delay: Duration) -> Self {
        self.redelivery_delay = delay;
        self
    }
}

#[derive(Debug)]
struct Delivery {
    job_id: String,
    job: ReviewJob,
    attempt: u32,
}

pub struct InProcessQueue {
    sender: mpsc::UnboundedSender<Delivery>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Delivery>>>,
    config: InProcessQueueConfig,
}

impl InProcessQueue {
    pub fn new(config: InProcessQueueConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            config,
        }
    }

    pub fn config(&self) -> &InProcessQueueConfig {
        &self.config
    }
}

#[async_trait]
impl ReviewQueue for InProcessQueue {
    async fn enqueue(&self, job: ReviewJob) -> Result<String, QueueError> {
        let job_id = Uuid::new_v4().to_string();
        debug!(job_id = %job_id, review_id = %job.review_id, "Job enqueued");
        self.sender
            .send(Delivery {
                job_id: job_id.clone(),
                job,
                attempt: 1,
            })
            .map_err(|_| QueueError::Closed)?;
        Ok(job_id)
    }

    /// Start the dispatcher. Jobs enqueued before this call are kept and
    /// delivered once the worker runs.
    fn create_worker(
        &self,
        handler: Arc<dyn ReviewJobHandler>,
    ) -> Result<Box<dyn WorkerHandle>, QueueError> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(QueueError::WorkerAttached)?;

        let cancel = CancellationToken::new();
        let dispatcher = Dispatcher {
            receiver,
            sender: self.sender.clone(),
            handler,
            semaphore: Arc::new(Semaphore::new(self.config.concurrency.max(1))),
            config: self.config.clone(),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(dispatcher.run());
        info!(concurrency = self.config.concurrency, "Review worker started");

        Ok(Box::new(InProcessWorker {
            cancel,
            task: Mutex::new(Some(task)),
        }))
    }
}

struct Dispatcher {
    receiver: mpsc::UnboundedReceiver<Delivery>,
    sender: mpsc::UnboundedSender<Delivery>,
    handler: Arc<dyn ReviewJobHandler>,
    semaphore: Arc<Semaphore>,
    config: InProcessQueueConfig,
    cancel: CancellationToken,
}

impl Dispatcher {
    async fn run(mut self) {
        let mut in_flight = JoinSet::new();

        loop {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = Arc::clone(&self.semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let delivery = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                delivery = self.receiver.recv() => match delivery {
                    Some(delivery) => delivery,
                    None => break,
                },
            };

            let handler = Arc::clone(&self.handler);
            let sender = self.sender.clone();
            let config = self.config.clone();
            let cancel = self.cancel.clone();
            in_flight.spawn(process(delivery, permit, handler, sender, config, cancel));

            // reap finished tasks so the set does not grow unbounded
            while in_flight.try_join_next().is_some() {}
        }

        debug!(in_flight = in_flight.len(), "Dispatcher draining");
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!("Job task join error: {}", e);
            }
        }
        info!("Review worker stopped");
    }
}

async fn process(
    delivery: Delivery,
    permit: OwnedSemaphorePermit,
    handler: Arc<dyn ReviewJobHandler>,
    sender: mpsc::UnboundedSender<Delivery>,
    config: InProcessQueueConfig,
    cancel: CancellationToken,
) {
    let Delivery {
        job_id,
        job,
        attempt,
    } = delivery;
    let review_id = job.review_id.clone();

    let outcome = handler.handle(job.clone()).await;
    // The slot is free while a failed job waits out its redelivery delay.
    drop(permit);
    let Err(e) = outcome else {
        debug!(job_id = %job_id, review_id = %review_id, attempt, "Job completed");
        return;
    };

    if !e.is_retryable() {
        error!(
            job_id = %job_id,
            review_id = %review_id,
            attempt,
            kind = %e.kind(),
            error = %e,
            "Job failed permanently"
        );
        return;
    }
    if attempt >= config.max_deliveries {
        error!(
            job_id = %job_id,
            review_id = %review_id,
            attempt,
            error = %e,
            "Job failed after max deliveries"
        );
        return;
    }

    warn!(
        job_id = %job_id,
        review_id = %review_id,
        attempt,
        error = %e,
        "Job failed, scheduling redelivery"
    );
    tokio::select! {
        _ = cancel.cancelled() => {
            warn!(job_id = %job_id, review_id = %review_id, "Worker closing, redelivery dropped");
        }
        _ = tokio::time::sleep(config.redelivery_delay) => {
            let redelivery = Delivery {
                job_id,
                job,
                attempt: attempt + 1,
            };
            if sender.send(redelivery).is_err() {
                warn!(review_id = %review_id, "Queue closed, redelivery dropped");
            }
        }
    }
}

struct InProcessWorker {
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl WorkerHandle for InProcessWorker {
    async fn close(&self) {
        self.cancel.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            warn!("Dispatcher join error: {}", e);
        }
    }
}
