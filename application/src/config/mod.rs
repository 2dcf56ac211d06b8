//! Application-level configuration.
//!
//! - [`PipelineParams`]: per-run limits used by the review use cases

pub mod pipeline_params;

pub use pipeline_params::PipelineParams;
