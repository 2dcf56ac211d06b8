//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod get_review_status;
pub mod process_review;
pub mod submit_listing;

#[cfg(test)]
pub(crate) mod test_support;
