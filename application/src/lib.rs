//! Application layer for listing-vetting
//!
//! This crate contains use cases, port definitions, resilience primitives and
//! the LLM-backed services. It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod resilience;
pub mod services;
pub mod use_cases;

// Re-export commonly used types
pub use config::PipelineParams;
pub use error::{ErrorKind, PipelineError};
pub use ports::{
    audit_log::{AuditEvent, AuditLogger, NoAuditLog},
    embedding::{EmbeddingError, EmbeddingService},
    llm_gateway::{
        CompletionRequest, CompletionResponse, ContentBlock, GatewayError, LlmGateway,
        TokenUsage, ToolSpec,
    },
    repository::{
        AgentConfigRepository, ListingRepository, PolicySearch, RepositoryError,
        ReviewRepository,
    },
    review_queue::{QueueError, ReviewJobHandler, ReviewQueue, WorkerHandle},
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryPolicy};
pub use services::{
    AgentFactory, CallOptions, Explainer, LlmClient, LlmClientConfig, LlmError, PolicyAgent,
    PolicyRouter,
};
pub use use_cases::get_review_status::{GetReviewStatusUseCase, ReviewStatusView};
pub use use_cases::process_review::ProcessReviewUseCase;
pub use use_cases::submit_listing::{SubmitListingOutput, SubmitListingUseCase};
