//! Get Review Status use case
//!
//! Status polling doubles as a reaper: a review still `pending` after the
//! staleness window is treated as a lost job, moved to `routing` and
//! re-enqueued under the same ids.

use crate::error::PipelineError;
use crate::ports::repository::{ListingRepository, ReviewRepository};
use crate::ports::review_queue::ReviewQueue;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use vetting_domain::{AgentViolation, Review, ReviewJob, ReviewStatus, ReviewTrace, Verdict};

/// What a caller polling a review sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStatusView {
    pub review_id: String,
    pub listing_id: String,
    pub status: ReviewStatus,
    pub verdict: Option<Verdict>,
    pub confidence: Option<f64>,
    pub explanation: Option<String>,
    pub violations: Vec<AgentViolation>,
    pub trace: ReviewTrace,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when this query found the review stuck and re-enqueued it.
    pub recovered: bool,
}

impl ReviewStatusView {
    fn from_review(review: Review, recovered: bool) -> Self {
        Self {
            review_id: review.id,
            listing_id: review.listing_id,
            status: review.status,
            verdict: review.verdict,
            confidence: review.confidence,
            explanation: review.explanation,
            violations: review.violations,
            trace: review.trace,
            created_at: review.created_at,
            updated_at: review.updated_at,
            recovered,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

pub struct GetReviewStatusUseCase {
    reviews: Arc<dyn ReviewRepository>,
    listings: Arc<dyn ListingRepository>,
    queue: Arc<dyn ReviewQueue>,
    stale_after: TimeDelta,
}

impl GetReviewStatusUseCase {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        listings: Arc<dyn ListingRepository>,
        queue: Arc<dyn ReviewQueue>,
    ) -> Self {
        Self {
            reviews,
            listings,
            queue,
            stale_after: TimeDelta::seconds(120),
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = TimeDelta::from_std(stale_after).unwrap_or(TimeDelta::MAX);
        self
    }

    pub async fn execute(&self, review_id: &str) -> Result<ReviewStatusView, PipelineError> {
        self.execute_at(review_id, Utc::now()).await
    }

    /// Same as [`execute`](Self::execute) with an explicit clock reading.
    pub async fn execute_at(
        &self,
        review_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewStatusView, PipelineError> {
        let review = self
            .reviews
            .get_by_id(review_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Review", review_id))?;

        if !review.is_stuck(now, self.stale_after) {
            return Ok(ReviewStatusView::from_review(review, false));
        }

        let listing = self
            .listings
            .get_by_id(&review.listing_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Listing", review.listing_id.clone()))?;

        warn!(
            review_id,
            pending_secs = (now - review.created_at).num_seconds(),
            "Review stuck in pending, re-enqueueing"
        );
        let review = self
            .reviews
            .update_status(review_id, ReviewStatus::Routing, None)
            .await?;
        let job = ReviewJob::new(review.id.clone(), listing.id, listing.tenant_id);
        let job_id = match self.queue.enqueue(job).await {
            Ok(job_id) => job_id,
            Err(e) => {
                // Back to pending so the next poll retries the recovery.
                if let Err(revert) = self
                    .reviews
                    .update_status(review_id, ReviewStatus::Pending, None)
                    .await
                {
                    error!(review_id, error = %revert, "Failed to return review to pending");
                }
                return Err(e.into());
            }
        };
        info!(review_id, job_id = %job_id, "Stuck review re-enqueued");

        Ok(ReviewStatusView::from_review(review, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::use_cases::test_support::*;

    fn use_case(store: &Arc<MemoryReviews>, queue: &Arc<RecordingQueue>) -> GetReviewStatusUseCase {
        GetReviewStatusUseCase::new(store.clone(), store.clone(), queue.clone())
    }

    #[tokio::test]
    async fn test_fresh_pending_review_is_returned_as_is() {
        let store = Arc::new(MemoryReviews::default());
        let queue = Arc::new(RecordingQueue::default());
        let now = Utc::now();
        store.seed(listing("l1", "t1"), pending_review("r1", "l1", now));

        let view = use_case(&store, &queue)
            .execute_at("r1", now + TimeDelta::seconds(30))
            .await
            .unwrap();

        assert_eq!(view.status, ReviewStatus::Pending);
        assert!(!view.recovered);
        assert!(queue.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stuck_review_is_reenqueued_with_same_ids() {
        let store = Arc::new(MemoryReviews::default());
        let queue = Arc::new(RecordingQueue::default());
        let created = Utc::now();
        store.seed(listing("l1", "t1"), pending_review("r1", "l1", created));

        let view = use_case(&store, &queue)
            .execute_at("r1", created + TimeDelta::seconds(121))
            .await
            .unwrap();

        assert_eq!(view.status, ReviewStatus::Routing);
        assert!(view.recovered);
        assert_eq!(
            *queue.jobs.lock().unwrap(),
            vec![ReviewJob::new("r1", "l1", "t1")]
        );
        assert_eq!(store.reviews.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_staleness_window() {
        let store = Arc::new(MemoryReviews::default());
        let queue = Arc::new(RecordingQueue::default());
        let created = Utc::now();
        store.seed(listing("l1", "t1"), pending_review("r1", "l1", created));

        let view = use_case(&store, &queue)
            .with_stale_after(Duration::from_secs(10))
            .execute_at("r1", created + TimeDelta::seconds(11))
            .await
            .unwrap();
        assert!(view.recovered);
    }

    #[tokio::test]
    async fn test_running_review_is_never_reenqueued() {
        let store = Arc::new(MemoryReviews::default());
        let queue = Arc::new(RecordingQueue::default());
        let created = Utc::now();
        let mut review = pending_review("r1", "l1", created);
        review.status = ReviewStatus::Scanning;
        store.seed(listing("l1", "t1"), review);

        let view = use_case(&store, &queue)
            .execute_at("r1", created + TimeDelta::hours(1))
            .await
            .unwrap();
        assert_eq!(view.status, ReviewStatus::Scanning);
        assert!(queue.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_review_is_not_found() {
        let store = Arc::new(MemoryReviews::default());
        let queue = Arc::new(RecordingQueue::default());
        let err = use_case(&store, &queue).execute("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_stuck_review_with_missing_listing_is_not_found() {
        let store = Arc::new(MemoryReviews::default());
        let queue = Arc::new(RecordingQueue::default());
        let created = Utc::now();
        store
            .reviews
            .lock()
            .unwrap()
            .insert("r1".into(), pending_review("r1", "gone", created));

        let err = use_case(&store, &queue)
            .execute_at("r1", created + TimeDelta::minutes(5))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Listing not found: gone");
        assert_eq!(store.review("r1").status, ReviewStatus::Pending);
    }

    #[tokio::test]
    async fn test_failed_reenqueue_returns_review_to_pending() {
        let store = Arc::new(MemoryReviews::default());
        let queue = Arc::new(RecordingQueue::default());
        *queue.closed.lock().unwrap() = true;
        let created = Utc::now();
        store.seed(listing("l1", "t1"), pending_review("r1", "l1", created));
        let status = use_case(&store, &queue);

        let err = status
            .execute_at("r1", created + TimeDelta::minutes(3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(store.review("r1").status, ReviewStatus::Pending);

        // Once the queue accepts jobs again the next poll recovers the review.
        *queue.closed.lock().unwrap() = false;
        let view = status
            .execute_at("r1", created + TimeDelta::minutes(4))
            .await
            .unwrap();
        assert!(view.recovered);
        assert_eq!(queue.jobs.lock().unwrap().len(), 1);
    }
}
