//! Repository ports
//!
//! Storage contracts the pipeline consumes. Only [`ReviewRepository`] is
//! written to during a run.

use async_trait::async_trait;
use thiserror::Error;
use vetting_domain::{
    AgentConfig, AggregatedDecision, Listing, NewListing, PolicyMatch, Review, ReviewStatus,
    ReviewTrace,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// An expected write touched no row
    #[error("No row written: {0}")]
    NoRowWritten(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Listing>, RepositoryError>;

    /// Insert the listing and its `pending` review in one transaction.
    async fn create_with_review(
        &self,
        listing: NewListing,
    ) -> Result<(Listing, Review), RepositoryError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Review>, RepositoryError>;

    /// Set the status; the stored trace is kept when `trace` is `None`.
    async fn update_status(
        &self,
        id: &str,
        status: ReviewStatus,
        trace: Option<&ReviewTrace>,
    ) -> Result<Review, RepositoryError>;

    /// Write the decision, explanation, trace, terminal status and violations
    /// in one transaction.
    async fn update_verdict(
        &self,
        id: &str,
        decision: &AggregatedDecision,
        explanation: &str,
        trace: &ReviewTrace,
    ) -> Result<Review, RepositoryError>;
}

#[async_trait]
pub trait AgentConfigRepository: Send + Sync {
    /// Active configs for the tenant, ordered by name.
    async fn get_active_by_tenant(&self, tenant_id: &str)
    -> Result<Vec<AgentConfig>, RepositoryError>;
}

#[async_trait]
pub trait PolicySearch: Send + Sync {
    /// Nearest policy chunks for the tenant, most similar first.
    ///
    /// An empty `source_files` filter searches every document.
    async fn search(
        &self,
        tenant_id: &str,
        query: &[f32],
        source_files: &[String],
        limit: usize,
    ) -> Result<Vec<PolicyMatch>, RepositoryError>;
}
