//! Process Review use case
//!
//! Runs one review through the pipeline:
//!
//! ```text
//! fetch → routing → scanning (agent fan-out) → aggregating → explaining → persist
//! ```
//!
//! Any stage error marks the review `failed` with the partial trace, then
//! propagates so the queue can decide on redelivery.

use crate::config::PipelineParams;
use crate::error::PipelineError;
use crate::ports::audit_log::{AuditEvent, AuditLogger, NoAuditLog};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::repository::{ListingRepository, RepositoryError, ReviewRepository};
use crate::ports::review_queue::ReviewJobHandler;
use crate::services::{AgentFactory, Explainer, PolicyRouter};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use vetting_domain::{
    AgentDispatchPlan, DomainError, Listing, NodeTrace, Review, ReviewJob, ReviewStatus,
    ReviewTrace, Stage, SubAgentResult, TokenTracker, aggregate,
};

/// Use case for running the review pipeline on one job
pub struct ProcessReviewUseCase<G: LlmGateway + 'static> {
    reviews: Arc<dyn ReviewRepository>,
    listings: Arc<dyn ListingRepository>,
    router: Arc<PolicyRouter>,
    agents: Arc<AgentFactory<G>>,
    explainer: Arc<Explainer<G>>,
    audit: Arc<dyn AuditLogger>,
    params: PipelineParams,
}

impl<G: LlmGateway + 'static> ProcessReviewUseCase<G> {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        listings: Arc<dyn ListingRepository>,
        router: Arc<PolicyRouter>,
        agents: Arc<AgentFactory<G>>,
        explainer: Arc<Explainer<G>>,
    ) -> Self {
        Self {
            reviews,
            listings,
            router,
            agents,
            explainer,
            audit: Arc::new(NoAuditLog),
            params: PipelineParams::default(),
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_params(mut self, params: PipelineParams) -> Self {
        self.params = params;
        self
    }

    /// Run the pipeline and return the decided review.
    pub async fn execute(&self, job: &ReviewJob) -> Result<Review, PipelineError> {
        let tracker = Arc::new(TokenTracker::new(self.params.token_budget));
        let mut tracer = StageTracer::default();

        info!(review_id = %job.review_id, tenant = %job.tenant_id, "Review run started");
        self.audit.log(AuditEvent::new(
            "review_started",
            json!({
                "review_id": job.review_id,
                "listing_id": job.listing_id,
                "tenant_id": job.tenant_id,
            }),
        ));

        match self.run(job, &tracker, &mut tracer).await {
            Ok(review) => {
                info!(
                    review_id = %review.id,
                    status = %review.status,
                    tokens = tracker.total(),
                    "Review run completed"
                );
                self.audit.log(AuditEvent::new(
                    "review_completed",
                    json!({
                        "review_id": review.id,
                        "status": review.status,
                        "verdict": review.verdict,
                        "confidence": review.confidence,
                        "tokens_used": tracker.total(),
                    }),
                ));
                Ok(review)
            }
            Err(e) => {
                let trace = tracer.finish(tracker.total()).failed_with(e.to_string());
                warn!(
                    review_id = %job.review_id,
                    kind = %e.kind(),
                    error = %e,
                    "Review run failed"
                );
                if let Err(write_err) = self
                    .reviews
                    .update_status(&job.review_id, ReviewStatus::Failed, Some(&trace))
                    .await
                {
                    error!(
                        review_id = %job.review_id,
                        error = %write_err,
                        "Failed to mark review as failed"
                    );
                }
                self.audit.log(AuditEvent::new(
                    "review_failed",
                    json!({
                        "review_id": job.review_id,
                        "kind": e.kind().to_string(),
                        "error": e.to_string(),
                        "trace": trace,
                    }),
                ));
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        job: &ReviewJob,
        tracker: &Arc<TokenTracker>,
        tracer: &mut StageTracer,
    ) -> Result<Review, PipelineError> {
        let review_id = job.review_id.as_str();

        self.reviews
            .update_status(review_id, ReviewStatus::Routing, None)
            .await
            .map_err(|e| match e {
                RepositoryError::NoRowWritten(_) => PipelineError::not_found("Review", review_id),
                other => other.into(),
            })?;

        let listing = tracer.track(Stage::Fetch, self.fetch(review_id)).await?;

        let plans = tracer
            .track(
                Stage::Routing,
                self.router.plan_dispatch(&listing, &job.tenant_id),
            )
            .await?;

        self.set_status(review_id, ReviewStatus::Scanning).await?;
        let listing = Arc::new(listing);
        let results = tracer
            .track(
                Stage::Scanning,
                self.run_agents(plans, Arc::clone(&listing), tracker),
            )
            .await?;

        self.set_status(review_id, ReviewStatus::Aggregating).await?;
        let decision = tracer
            .track(Stage::Aggregating, async {
                aggregate(&results).map_err(PipelineError::from)
            })
            .await?;

        let explanation = tracer
            .track(
                Stage::Explaining,
                self.explainer
                    .explain(&decision, &listing, &results, tracker),
            )
            .await?;

        let trace = tracer.snapshot(tracker.total());
        let review = tracer
            .track(Stage::Persist, async {
                self.reviews
                    .update_verdict(review_id, &decision, &explanation, &trace)
                    .await
                    .map_err(PipelineError::from)
            })
            .await?;

        info!(
            review_id,
            verdict = %decision.verdict,
            confidence = decision.confidence,
            duration_ms = trace.total_duration_ms(),
            "Decision persisted"
        );
        if decision.has_violations() {
            debug!(
                review_id,
                sections = ?decision
                    .violations
                    .iter()
                    .map(|v| v.policy_section.as_str())
                    .collect::<Vec<_>>(),
                "Violations recorded"
            );
        }
        Ok(review)
    }

    async fn set_status(&self, review_id: &str, status: ReviewStatus) -> Result<(), PipelineError> {
        self.reviews.update_status(review_id, status, None).await?;
        Ok(())
    }

    async fn fetch(&self, review_id: &str) -> Result<Listing, PipelineError> {
        let review = self
            .reviews
            .get_by_id(review_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Review", review_id))?;
        self.listings
            .get_by_id(&review.listing_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Listing", review.listing_id.clone()))
    }

    /// Evaluate every plan concurrently and wait for all of them.
    ///
    /// Failed agents are dropped. The run aborts when none succeed or when any
    /// agent overran the token budget.
    async fn run_agents(
        &self,
        plans: Vec<AgentDispatchPlan>,
        listing: Arc<Listing>,
        tracker: &Arc<TokenTracker>,
    ) -> Result<Vec<SubAgentResult>, PipelineError> {
        let dispatched = plans.len();
        let mut join_set = JoinSet::new();

        for (index, plan) in plans.into_iter().enumerate() {
            let agent = self.agents.create_policy_agent(plan.config, &plan.policies);
            let listing = Arc::clone(&listing);
            let tracker = Arc::clone(tracker);
            join_set.spawn(async move {
                let result = agent.evaluate(&listing, &tracker).await;
                (index, agent.name().to_string(), result)
            });
        }

        let mut slots: Vec<Option<SubAgentResult>> = vec![None; dispatched];
        let mut budget_overrun = None;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, agent, Ok(result))) => {
                    info!(
                        agent = %agent,
                        verdict = %result.verdict,
                        confidence = result.confidence,
                        "Agent completed"
                    );
                    slots[index] = Some(result);
                }
                Ok((_, agent, Err(e))) => {
                    warn!(agent = %agent, error = %e, "Agent failed");
                    if matches!(
                        e,
                        PipelineError::Domain(DomainError::TokenBudgetExceeded { .. })
                    ) && budget_overrun.is_none()
                    {
                        budget_overrun = Some(e);
                    }
                }
                Err(e) => {
                    warn!("Agent task join error: {}", e);
                }
            }
        }

        if let Some(e) = budget_overrun {
            return Err(e);
        }

        let results: Vec<SubAgentResult> = slots.into_iter().flatten().collect();
        if results.is_empty() {
            return Err(PipelineError::invariant(format!(
                "All agents failed ({dispatched} dispatched)"
            )));
        }
        info!(
            succeeded = results.len(),
            dispatched,
            "Agent fan-out settled"
        );
        Ok(results)
    }
}

#[async_trait]
impl<G: LlmGateway + 'static> ReviewJobHandler for ProcessReviewUseCase<G> {
    async fn handle(&self, job: ReviewJob) -> Result<(), PipelineError> {
        self.execute(&job).await.map(|_| ())
    }
}

/// Records one [`NodeTrace`] per stage, whether the stage succeeds or fails.
#[derive(Default)]
struct StageTracer {
    trace: ReviewTrace,
}

impl StageTracer {
    async fn track<T, F>(&mut self, stage: Stage, stage_future: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let result = stage_future.await;
        self.trace.push(NodeTrace {
            stage,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            error: result.as_ref().err().map(|e| e.to_string()),
        });
        result
    }

    fn snapshot(&self, tokens_used: u64) -> ReviewTrace {
        ReviewTrace {
            tokens_used,
            ..self.trace.clone()
        }
    }

    fn finish(mut self, tokens_used: u64) -> ReviewTrace {
        self.trace.tokens_used = tokens_used;
        self.trace
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ports::llm_gateway::GatewayError;
    use crate::resilience::CircuitBreaker;
    use crate::services::LlmClient;
    use crate::use_cases::test_support::*;
    use serde_json::json;
    use vetting_domain::{AgentConfig, Severity, Verdict};

    struct Harness {
        store: Arc<MemoryReviews>,
        gateway: Arc<ScriptedGateway>,
        use_case: ProcessReviewUseCase<ScriptedGateway>,
        job: ReviewJob,
    }

    fn harness(gateway: ScriptedGateway, agents: &[&str], params: PipelineParams) -> Harness {
        let store = Arc::new(MemoryReviews::default());
        store.seed(
            listing("l1", "t1"),
            pending_review("r1", "l1", Utc::now()),
        );

        let configs = agents
            .iter()
            .enumerate()
            .map(|(i, name)| {
                AgentConfig::new(format!("a{i}"), "t1", *name, "Check {{POLICY_CONTEXT}}")
            })
            .collect();

        let gateway = Arc::new(gateway);
        let client = Arc::new(LlmClient::new(
            Arc::clone(&gateway),
            Arc::new(CircuitBreaker::with_defaults("llm")),
        ));
        let router = PolicyRouter::new(
            Arc::new(FixedConfigs(configs)),
            Arc::new(NoPolicies),
            Arc::new(UnitEmbedding),
        );
        let use_case = ProcessReviewUseCase::new(
            store.clone(),
            store.clone(),
            Arc::new(router),
            Arc::new(AgentFactory::new(Arc::clone(&client))),
            Arc::new(Explainer::new(client)),
        )
        .with_params(params);

        Harness {
            store,
            gateway,
            use_case,
            job: ReviewJob::new("r1", "l1", "t1"),
        }
    }

    fn bad_request() -> GatewayError {
        GatewayError::Api {
            status: 400,
            message: "invalid".into(),
        }
    }

    fn stages(review: &Review) -> Vec<Stage> {
        review.trace.nodes.iter().map(|n| n.stage).collect()
    }

    #[tokio::test]
    async fn test_confident_approval_completes() {
        let gateway = ScriptedGateway::new()
            .with_findings("prohibited", "approved", 0.95)
            .with_findings("health-claims", "approved", 0.9);
        let h = harness(gateway, &["health-claims", "prohibited"], PipelineParams::default());

        let review = h.use_case.execute(&h.job).await.unwrap();

        assert_eq!(review.status, ReviewStatus::Complete);
        assert_eq!(review.verdict, Some(Verdict::Approved));
        assert!((review.confidence.unwrap() - 0.925).abs() < 1e-9);
        assert_eq!(
            review.explanation.as_deref(),
            Some("Explanation of the decision.")
        );
        assert_eq!(
            stages(&review),
            vec![
                Stage::Fetch,
                Stage::Routing,
                Stage::Scanning,
                Stage::Aggregating,
                Stage::Explaining
            ]
        );
        assert_eq!(review.trace.tokens_used, 300);
        assert_eq!(
            *h.store.status_history.lock().unwrap(),
            vec![
                ReviewStatus::Routing,
                ReviewStatus::Scanning,
                ReviewStatus::Aggregating,
                ReviewStatus::Complete
            ]
        );
    }

    #[tokio::test]
    async fn test_escalated_verdict_sets_escalated_status() {
        let gateway = ScriptedGateway::new()
            .with_findings("prohibited", "approved", 0.8)
            .with_findings("health-claims", "approved", 0.8);
        let h = harness(gateway, &["health-claims", "prohibited"], PipelineParams::default());

        let review = h.use_case.execute(&h.job).await.unwrap();
        assert_eq!(review.verdict, Some(Verdict::Escalated));
        assert_eq!(review.status, ReviewStatus::Escalated);
    }

    #[tokio::test]
    async fn test_rejection_persists_violations() {
        let gateway = ScriptedGateway::new()
            .with_findings("prohibited", "approved", 0.95)
            .with_tool_input(
                "disintermediation",
                json!({
                    "verdict": "rejected",
                    "confidence": 0.85,
                    "violations": [
                        {"policySection": "2.1", "severity": "high", "description": "Email address"}
                    ],
                    "reasoning": "Contact details in description"
                }),
            );
        let h = harness(
            gateway,
            &["disintermediation", "prohibited"],
            PipelineParams::default(),
        );

        let review = h.use_case.execute(&h.job).await.unwrap();
        assert_eq!(review.status, ReviewStatus::Complete);
        assert_eq!(review.verdict, Some(Verdict::Rejected));
        assert_eq!(review.violations.len(), 1);
        assert_eq!(review.violations[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_partial_agent_failure_is_tolerated() {
        let gateway = ScriptedGateway::new()
            .with_findings("prohibited", "approved", 0.95)
            .with_failure("health-claims", bad_request());
        let h = harness(gateway, &["health-claims", "prohibited"], PipelineParams::default());

        let review = h.use_case.execute(&h.job).await.unwrap();
        assert_eq!(review.verdict, Some(Verdict::Approved));
        assert!((review.confidence.unwrap() - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_all_agents_failing_marks_review_failed() {
        let gateway = ScriptedGateway::new()
            .with_failure("prohibited", bad_request())
            .with_failure("health-claims", bad_request());
        let h = harness(gateway, &["health-claims", "prohibited"], PipelineParams::default());

        let err = h.use_case.execute(&h.job).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
        assert!(err.to_string().starts_with("All agents failed"));

        let review = h.store.review("r1");
        assert_eq!(review.status, ReviewStatus::Failed);
        assert!(review.verdict.is_none());
        assert_eq!(review.trace.failed_stage(), Some(Stage::Scanning));
        assert!(review.trace.error.as_deref().unwrap().starts_with("All agents failed"));

        // the explainer never ran
        let requests = h.gateway.requests.lock().unwrap();
        assert!(requests.iter().all(|r| r.tool.is_some()));
    }

    #[tokio::test]
    async fn test_budget_overrun_aborts_run() {
        let gateway = ScriptedGateway::new()
            .with_findings("prohibited", "approved", 0.95)
            .with_findings("health-claims", "approved", 0.95)
            .with_tokens_per_call(600);
        let h = harness(
            gateway,
            &["health-claims", "prohibited"],
            PipelineParams::default().with_token_budget(1_000),
        );

        let err = h.use_case.execute(&h.job).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Domain(DomainError::TokenBudgetExceeded { budget: 1_000, .. })
        ));
        assert_eq!(h.store.review("r1").status, ReviewStatus::Failed);
    }

    #[tokio::test]
    async fn test_missing_review_is_not_found() {
        let h = harness(ScriptedGateway::new(), &["prohibited"], PipelineParams::default());
        let job = ReviewJob::new("missing", "l1", "t1");

        let err = h.use_case.execute(&job).await.unwrap_err();
        assert_eq!(err.to_string(), "Review not found: missing");
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_listing_is_not_found() {
        let h = harness(ScriptedGateway::new(), &["prohibited"], PipelineParams::default());
        h.store
            .reviews
            .lock()
            .unwrap()
            .insert("r2".into(), pending_review("r2", "gone", Utc::now()));

        let err = h
            .use_case
            .execute(&ReviewJob::new("r2", "gone", "t1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let review = h.store.review("r2");
        assert_eq!(review.status, ReviewStatus::Failed);
        assert_eq!(stages(&review), vec![Stage::Fetch]);
    }

    #[tokio::test]
    async fn test_no_active_agents_fails_at_routing() {
        let h = harness(ScriptedGateway::new(), &[], PipelineParams::default());
        let err = h.use_case.execute(&h.job).await.unwrap_err();
        assert_eq!(err.to_string(), "No active agent configurations for tenant: t1");
        assert_eq!(h.store.review("r1").trace.failed_stage(), Some(Stage::Routing));
    }

    #[tokio::test]
    async fn test_failed_status_write_does_not_mask_error() {
        let gateway = ScriptedGateway::new().with_failure("prohibited", bad_request());
        let h = harness(gateway, &["prohibited"], PipelineParams::default());
        *h.store.fail_status_writes.lock().unwrap() = true;

        let err = h.use_case.execute(&h.job).await.unwrap_err();
        assert!(err.to_string().starts_with("All agents failed"));
        assert_eq!(h.store.review("r1").status, ReviewStatus::Scanning);
    }
}
