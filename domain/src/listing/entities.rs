//! Listing entities

use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MAX_TITLE_CHARS: usize = 200;
const MAX_DESCRIPTION_CHARS: usize = 5000;

/// A marketplace listing (Entity)
///
/// Immutable once created. The pipeline only ever reads listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Text used as the similarity-search query for policy retrieval.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// A listing as submitted by a caller, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    pub tenant_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewListing {
    pub fn new(
        tenant_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            title: title.into(),
            description: description.into(),
            category: category.into(),
            image_urls: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_urls.push(url.into());
        self
    }

    /// Validate caller input.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.tenant_id.trim().is_empty() {
            return Err(DomainError::InvalidListing("tenant id is required".into()));
        }
        check_length("title", &self.title, MAX_TITLE_CHARS)?;
        check_length("description", &self.description, MAX_DESCRIPTION_CHARS)?;
        if self.category.trim().is_empty() {
            return Err(DomainError::InvalidListing("category is required".into()));
        }
        if let Some(url) = self
            .image_urls
            .iter()
            .find(|u| !(u.starts_with("http://") || u.starts_with("https://")))
        {
            return Err(DomainError::InvalidListing(format!(
                "image url is not http(s): {url}"
            )));
        }
        Ok(())
    }

    /// Materialize the listing with its assigned id and creation time.
    pub fn into_listing(self, id: impl Into<String>, created_at: DateTime<Utc>) -> Listing {
        Listing {
            id: id.into(),
            tenant_id: self.tenant_id,
            title: self.title,
            description: self.description,
            category: self.category,
            image_urls: self.image_urls,
            metadata: self.metadata,
            created_at,
        }
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(DomainError::InvalidListing(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(DomainError::InvalidListing(format!(
            "{field} exceeds {max} characters"
        )));
    }
    Ok(())
}
