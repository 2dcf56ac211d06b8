//! Hand-written port fakes shared by the use case tests.

use crate::ports::embedding::{EmbeddingError, EmbeddingService};
use crate::ports::llm_gateway::{
    CompletionRequest, CompletionResponse, ContentBlock, GatewayError, LlmGateway, TokenUsage,
};
use crate::ports::repository::{
    AgentConfigRepository, ListingRepository, PolicySearch, RepositoryError, ReviewRepository,
};
use crate::ports::review_queue::{QueueError, ReviewJobHandler, ReviewQueue, WorkerHandle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vetting_domain::{
    AgentConfig, AggregatedDecision, Listing, NewListing, PolicyMatch, Review, ReviewJob,
    ReviewStatus, ReviewTrace,
};

// ==================== Gateway ====================

/// Answers structured calls per tool name and text calls with a fixed explanation
pub struct ScriptedGateway {
    tools: HashMap<String, Result<Value, GatewayError>>,
    tokens_per_call: u64,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            tokens_per_call: 100,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_findings(mut self, agent: &str, verdict: &str, confidence: f64) -> Self {
        self.tools.insert(
            tool(agent),
            Ok(json!({
                "verdict": verdict,
                "confidence": confidence,
                "violations": [],
                "reasoning": format!("{agent} says {verdict}")
            })),
        );
        self
    }

    pub fn with_tool_input(mut self, agent: &str, input: Value) -> Self {
        self.tools.insert(tool(agent), Ok(input));
        self
    }

    pub fn with_failure(mut self, agent: &str, error: GatewayError) -> Self {
        self.tools.insert(tool(agent), Err(error));
        self
    }

    pub fn with_tokens_per_call(mut self, tokens: u64) -> Self {
        self.tokens_per_call = tokens;
        self
    }
}

fn tool(agent: &str) -> String {
    format!("submit_{}_analysis", agent.replace('-', "_"))
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        let usage = TokenUsage {
            input_tokens: self.tokens_per_call,
            output_tokens: 0,
        };
        let content = match &request.tool {
            None => ContentBlock::Text("Explanation of the decision.".to_string()),
            Some(spec) => {
                let input = self
                    .tools
                    .get(&spec.name)
                    .cloned()
                    .unwrap_or_else(|| Err(GatewayError::InvalidResponse("unscripted".into())))?;
                ContentBlock::ToolUse {
                    name: spec.name.clone(),
                    input,
                }
            }
        };
        Ok(CompletionResponse {
            content: vec![content],
            usage,
        })
    }
}

// ==================== Repositories ====================

/// Listings and reviews in one map pair; records every status write
#[derive(Default)]
pub struct MemoryReviews {
    pub listings: Mutex<HashMap<String, Listing>>,
    pub reviews: Mutex<HashMap<String, Review>>,
    pub status_history: Mutex<Vec<ReviewStatus>>,
    pub fail_status_writes: Mutex<bool>,
    next_id: Mutex<u32>,
}

impl MemoryReviews {
    pub fn seed(&self, listing: Listing, review: Review) {
        self.listings.lock().unwrap().insert(listing.id.clone(), listing);
        self.reviews.lock().unwrap().insert(review.id.clone(), review);
    }

    pub fn review(&self, id: &str) -> Review {
        self.reviews.lock().unwrap()[id].clone()
    }
}

#[async_trait]
impl ListingRepository for MemoryReviews {
    async fn get_by_id(&self, id: &str) -> Result<Option<Listing>, RepositoryError> {
        Ok(self.listings.lock().unwrap().get(id).cloned())
    }

    async fn create_with_review(
        &self,
        listing: NewListing,
    ) -> Result<(Listing, Review), RepositoryError> {
        let n = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let now = Utc::now();
        let listing = listing.into_listing(format!("listing-{n}"), now);
        let review = Review::pending(format!("review-{n}"), listing.id.clone(), now);
        self.seed(listing.clone(), review.clone());
        Ok((listing, review))
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviews {
    async fn get_by_id(&self, id: &str) -> Result<Option<Review>, RepositoryError> {
        Ok(self.reviews.lock().unwrap().get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: ReviewStatus,
        trace: Option<&ReviewTrace>,
    ) -> Result<Review, RepositoryError> {
        if *self.fail_status_writes.lock().unwrap() && status == ReviewStatus::Failed {
            return Err(RepositoryError::Storage("connection lost".into()));
        }
        let mut reviews = self.reviews.lock().unwrap();
        let review = reviews
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NoRowWritten(format!("review {id}")))?;
        review.status = status;
        if let Some(trace) = trace {
            review.trace = trace.clone();
        }
        review.updated_at = Utc::now();
        self.status_history.lock().unwrap().push(status);
        Ok(review.clone())
    }

    async fn update_verdict(
        &self,
        id: &str,
        decision: &AggregatedDecision,
        explanation: &str,
        trace: &ReviewTrace,
    ) -> Result<Review, RepositoryError> {
        let mut reviews = self.reviews.lock().unwrap();
        let review = reviews
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NoRowWritten(format!("review {id}")))?;
        review.status = ReviewStatus::terminal_for(decision.verdict);
        review.verdict = Some(decision.verdict);
        review.confidence = Some(decision.confidence);
        review.explanation = Some(explanation.to_string());
        review.violations = decision.violations.clone();
        review.trace = trace.clone();
        self.status_history.lock().unwrap().push(review.status);
        Ok(review.clone())
    }
}

pub struct FixedConfigs(pub Vec<AgentConfig>);

#[async_trait]
impl AgentConfigRepository for FixedConfigs {
    async fn get_active_by_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<AgentConfig>, RepositoryError> {
        Ok(self
            .0
            .iter()
            .filter(|c| c.tenant_id == tenant_id && c.active)
            .cloned()
            .collect())
    }
}

pub struct NoPolicies;

#[async_trait]
impl PolicySearch for NoPolicies {
    async fn search(
        &self,
        _tenant_id: &str,
        _query: &[f32],
        _source_files: &[String],
        _limit: usize,
    ) -> Result<Vec<PolicyMatch>, RepositoryError> {
        Ok(vec![PolicyMatch::new("general.md", "Be honest.", 0.5)])
    }
}

pub struct UnitEmbedding;

#[async_trait]
impl EmbeddingService for UnitEmbedding {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

// ==================== Queue ====================

#[derive(Default)]
pub struct RecordingQueue {
    pub jobs: Mutex<Vec<ReviewJob>>,
    pub closed: Mutex<bool>,
}

#[async_trait]
impl ReviewQueue for RecordingQueue {
    async fn enqueue(&self, job: ReviewJob) -> Result<String, QueueError> {
        if *self.closed.lock().unwrap() {
            return Err(QueueError::Closed);
        }
        let mut jobs = self.jobs.lock().unwrap();
        jobs.push(job);
        Ok(format!("job-{}", jobs.len()))
    }

    fn create_worker(
        &self,
        _handler: Arc<dyn ReviewJobHandler>,
    ) -> Result<Box<dyn WorkerHandle>, QueueError> {
        Err(QueueError::Closed)
    }
}

// ==================== Fixtures ====================

pub fn listing(id: &str, tenant_id: &str) -> Listing {
    Listing {
        id: id.into(),
        tenant_id: tenant_id.into(),
        title: "Vintage camera".into(),
        description: "Works well, contact seller@example.com".into(),
        category: "electronics".into(),
        image_urls: vec![],
        metadata: Default::default(),
        created_at: Utc::now(),
    }
}

pub fn pending_review(id: &str, listing_id: &str, created_at: DateTime<Utc>) -> Review {
    Review::pending(id, listing_id, created_at)
}
