//! In-memory storage adapter
//!
//! Implements every repository port plus tenant-scoped cosine similarity
//! search over policy chunks. Each write holds a single lock, so
//! `update_verdict` lands as one unit.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;
use vetting_application::ports::repository::{
    AgentConfigRepository, ListingRepository, PolicySearch, RepositoryError, ReviewRepository,
};
use vetting_domain::{
    AgentConfig, AggregatedDecision, Listing, NewListing, PolicyChunk, PolicyMatch, Review,
    ReviewStatus, ReviewTrace,
};

#[derive(Default)]
struct Tables {
    listings: HashMap<String, Listing>,
    reviews: HashMap<String, Review>,
    agent_configs: Vec<AgentConfig>,
    /// Policy chunks keyed by tenant
    policies: HashMap<String, Vec<PolicyChunk>>,
}

/// Process-local store behind all repository ports
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace agent configs, keyed by id.
    pub fn upsert_agent_configs(&self, configs: impl IntoIterator<Item = AgentConfig>) {
        let mut tables = self.lock();
        for config in configs {
            match tables.agent_configs.iter_mut().find(|c| c.id == config.id) {
                Some(existing) => *existing = config,
                None => tables.agent_configs.push(config),
            }
        }
    }

    /// Replace the tenant's chunks for every source file present in `chunks`.
    pub fn store_policy_chunks(&self, tenant_id: &str, chunks: Vec<PolicyChunk>) {
        let mut tables = self.lock();
        let stored = tables.policies.entry(tenant_id.to_string()).or_default();
        stored.retain(|existing| !chunks.iter().any(|c| c.source_file == existing.source_file));
        stored.extend(chunks);
    }

    pub fn policy_chunk_count(&self, tenant_id: &str) -> usize {
        self.lock().policies.get(tenant_id).map_or(0, Vec::len)
    }
}

/// Cosine similarity; zero for mismatched lengths or zero vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Listing>, RepositoryError> {
        Ok(self.lock().listings.get(id).cloned())
    }

    async fn create_with_review(
        &self,
        listing: NewListing,
    ) -> Result<(Listing, Review), RepositoryError> {
        let now = Utc::now();
        let listing = listing.into_listing(Uuid::new_v4().to_string(), now);
        let review = Review::pending(Uuid::new_v4().to_string(), listing.id.clone(), now);

        let mut tables = self.lock();
        tables.listings.insert(listing.id.clone(), listing.clone());
        tables.reviews.insert(review.id.clone(), review.clone());
        debug!(listing_id = %listing.id, review_id = %review.id, "Listing stored");
        Ok((listing, review))
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Review>, RepositoryError> {
        Ok(self.lock().reviews.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: ReviewStatus,
        trace: Option<&ReviewTrace>,
    ) -> Result<Review, RepositoryError> {
        let mut tables = self.lock();
        let review = tables
            .reviews
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NoRowWritten(format!("review {id}")))?;
        review.status = status;
        if let Some(trace) = trace {
            review.trace = trace.clone();
        }
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn update_verdict(
        &self,
        id: &str,
        decision: &AggregatedDecision,
        explanation: &str,
        trace: &ReviewTrace,
    ) -> Result<Review, RepositoryError> {
        let mut tables = self.lock();
        let review = tables
            .reviews
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NoRowWritten(format!("review {id}")))?;
        review.status = ReviewStatus::terminal_for(decision.verdict);
        review.verdict = Some(decision.verdict);
        review.confidence = Some(decision.confidence);
        review.explanation = Some(explanation.to_string());
        review.violations = decision.violations.clone();
        review.trace = trace.clone();
        review.updated_at = Utc::now();
        Ok(review.clone())
    }
}

#[async_trait]
impl AgentConfigRepository for InMemoryStore {
    async fn get_active_by_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<AgentConfig>, RepositoryError> {
        let mut configs: Vec<AgentConfig> = self
            .lock()
            .agent_configs
            .iter()
            .filter(|c| c.tenant_id == tenant_id && c.active)
            .cloned()
            .collect();
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(configs)
    }
}

#[async_trait]
impl PolicySearch for InMemoryStore {
    async fn search(
        &self,
        tenant_id: &str,
        query: &[f32],
        source_files: &[String],
        limit: usize,
    ) -> Result<Vec<PolicyMatch>, RepositoryError> {
        if query.is_empty() {
            return Err(RepositoryError::InvalidQuery(
                "embedding must be a non-empty array".into(),
            ));
        }

        let tables = self.lock();
        let Some(chunks) = tables.policies.get(tenant_id) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f32, &PolicyChunk)> = chunks
            .iter()
            .filter(|c| source_files.is_empty() || source_files.contains(&c.source_file))
            .map(|c| (cosine_similarity(query, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(similarity, c)| {
                PolicyMatch::new(c.source_file.clone(), c.content.clone(), similarity)
            })
            .collect())
    }
}
