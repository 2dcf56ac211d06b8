//! Policy routing
//!
//! Decides which agents run for a listing and which policy text each one
//! sees. The listing is embedded once; each active agent then gets its own
//! similarity search scoped to the agent's policy files.

use crate::error::PipelineError;
use crate::ports::embedding::EmbeddingService;
use crate::ports::repository::{AgentConfigRepository, PolicySearch};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};
use vetting_domain::{AgentDispatchPlan, Listing};

pub const DEFAULT_POLICY_TOP_K: usize = 10;

pub struct PolicyRouter {
    agent_configs: Arc<dyn AgentConfigRepository>,
    policies: Arc<dyn PolicySearch>,
    embeddings: Arc<dyn EmbeddingService>,
    top_k: usize,
}

impl PolicyRouter {
    pub fn new(
        agent_configs: Arc<dyn AgentConfigRepository>,
        policies: Arc<dyn PolicySearch>,
        embeddings: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            agent_configs,
            policies,
            embeddings,
            top_k: DEFAULT_POLICY_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// One dispatch plan per active agent config of the tenant.
    pub async fn plan_dispatch(
        &self,
        listing: &Listing,
        tenant_id: &str,
    ) -> Result<Vec<AgentDispatchPlan>, PipelineError> {
        let configs = self.agent_configs.get_active_by_tenant(tenant_id).await?;
        if configs.is_empty() {
            return Err(PipelineError::invariant(format!(
                "No active agent configurations for tenant: {tenant_id}"
            )));
        }

        let embedding = self
            .embeddings
            .embed(&[listing.search_text()])
            .await?
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PipelineError::invariant("Failed to generate embedding for listing"))?;

        let searches = configs.into_iter().map(|config| {
            let embedding = &embedding;
            async move {
                let policies = self
                    .policies
                    .search(tenant_id, embedding, &config.policy_source_files, self.top_k)
                    .await?;
                debug!(
                    agent = %config.name,
                    matches = policies.len(),
                    "Retrieved policies for agent"
                );
                Ok::<_, PipelineError>(AgentDispatchPlan::new(config, policies))
            }
        });
        let plans = try_join_all(searches).await?;

        info!(tenant = tenant_id, agents = plans.len(), "Planned agent dispatch");
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::embedding::EmbeddingError;
    use crate::ports::repository::RepositoryError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use vetting_domain::{AgentConfig, PolicyMatch};

    struct FixedConfigs(Vec<AgentConfig>);

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

    /// Records every search and answers with one match per filter entry
    #[derive(Default)]
    struct RecordingSearch {
        calls: Mutex<Vec<(String, Vec<String>, usize)>>,
    }

    #[async_trait]
    impl PolicySearch for RecordingSearch {
        async fn search(
            &self,
            tenant_id: &str,
            _query: &[f32],
            source_files: &[String],
            limit: usize,
        ) -> Result<Vec<PolicyMatch>, RepositoryError> {
            self.calls.lock().unwrap().push((
                tenant_id.to_string(),
                source_files.to_vec(),
                limit,
            ));
            Ok(source_files
                .iter()
                .map(|f| PolicyMatch::new(f.clone(), "policy text", 0.9))
                .collect())
        }
    }

    struct FixedEmbedding(Vec<f32>);

    #[async_trait]
    impl EmbeddingService for FixedEmbedding {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }
    }

    fn listing() -> Listing {
        Listing {
            id: "l1".into(),
            tenant_id: "t1".into(),
            title: "Protein powder".into(),
            description: "Cures everything".into(),
            category: "health".into(),
            image_urls: vec![],
            metadata: Default::default(),
            created_at: Utc::now(),
        }
    }

    fn configs() -> Vec<AgentConfig> {
        vec![
            AgentConfig::new("a1", "t1", "health-claims", "p")
                .with_policy_source_files(vec!["health.md".into()]),
            AgentConfig::new("a2", "t1", "prohibited", "p"),
            AgentConfig::new("a3", "t1", "retired", "p").with_active(false),
            AgentConfig::new("a4", "t2", "other-tenant", "p"),
        ]
    }

    #[tokio::test]
    async fn test_plans_one_per_active_config() {
        let search = Arc::new(RecordingSearch::default());
        let router = PolicyRouter::new(
            Arc::new(FixedConfigs(configs())),
            search.clone(),
            Arc::new(FixedEmbedding(vec![0.1, 0.2])),
        );

        let plans = router.plan_dispatch(&listing(), "t1").await.unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].agent_name(), "health-claims");
        assert_eq!(plans[0].policies[0].source_file, "health.md");
        assert!(plans[1].policies.is_empty());

        let calls = search.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(tenant, _, limit)| tenant == "t1" && *limit == 10));
        assert!(calls.iter().any(|(_, filter, _)| filter.is_empty()));
    }

    #[tokio::test]
    async fn test_no_active_agents_is_invariant() {
        let router = PolicyRouter::new(
            Arc::new(FixedConfigs(configs())),
            Arc::new(RecordingSearch::default()),
            Arc::new(FixedEmbedding(vec![0.1])),
        );
        let err = router.plan_dispatch(&listing(), "t-none").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No active agent configurations for tenant: t-none"
        );
        assert_eq!(err.kind(), crate::error::ErrorKind::Invariant);
    }

    #[tokio::test]
    async fn test_empty_embedding_is_invariant() {
        let router = PolicyRouter::new(
            Arc::new(FixedConfigs(configs())),
            Arc::new(RecordingSearch::default()),
            Arc::new(FixedEmbedding(vec![])),
        );
        let err = router.plan_dispatch(&listing(), "t1").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate embedding for listing");
    }

    #[tokio::test]
    async fn test_top_k_is_passed_to_search() {
        let search = Arc::new(RecordingSearch::default());
        let router = PolicyRouter::new(
            Arc::new(FixedConfigs(configs())),
            search.clone(),
            Arc::new(FixedEmbedding(vec![1.0])),
        )
        .with_top_k(3);
        router.plan_dispatch(&listing(), "t1").await.unwrap();
        assert!(search.calls.lock().unwrap().iter().all(|(_, _, k)| *k == 3));
    }
}
