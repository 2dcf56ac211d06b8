//! Review domain
//!
//! A [`Review`] tracks one pipeline run for one listing through the status
//! machine:
//!
//! ```text
//! pending → routing → scanning → aggregating → {complete | escalated}
//!              └──────────┴───────────┴──────→ failed
//! ```

pub mod entities;
pub mod trace;

pub use entities::{Review, ReviewJob, ReviewStatus};
pub use trace::{NodeTrace, ReviewTrace, Stage};
