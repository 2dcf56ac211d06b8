//! Marketplace listings submitted for compliance review.

pub mod entities;

pub use entities::{Listing, NewListing};
