//! Submit Listing use case

use crate::error::PipelineError;
use crate::ports::repository::ListingRepository;
use crate::ports::review_queue::ReviewQueue;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use vetting_domain::{NewListing, ReviewJob};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitListingOutput {
    pub review_id: String,
    pub listing_id: String,
    /// `None` when the job could not be enqueued; status polling recovers it.
    pub job_id: Option<String>,
}

/// Stores a listing with its pending review and queues the review run
pub struct SubmitListingUseCase {
    listings: Arc<dyn ListingRepository>,
    queue: Arc<dyn ReviewQueue>,
}

impl SubmitListingUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>, queue: Arc<dyn ReviewQueue>) -> Self {
        Self { listings, queue }
    }

    pub async fn execute(&self, input: NewListing) -> Result<SubmitListingOutput, PipelineError> {
        input.validate()?;

        let tenant_id = input.tenant_id.clone();
        let (listing, review) = self.listings.create_with_review(input).await?;
        info!(
            review_id = %review.id,
            listing_id = %listing.id,
            tenant = %tenant_id,
            "Listing submitted"
        );

        let job = ReviewJob::new(review.id.clone(), listing.id.clone(), tenant_id);
        let job_id = match self.queue.enqueue(job).await {
            Ok(job_id) => Some(job_id),
            Err(e) => {
                warn!(
                    review_id = %review.id,
                    error = %e,
                    "Enqueue failed; review left pending for recovery"
                );
                None
            }
        };

        Ok(SubmitListingOutput {
            review_id: review.id,
            listing_id: listing.id,
            job_id,
        })
    }
}
