use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::{normalize_category, parse_published_at};

/// What the listing engine needs to know about a record.
pub trait Listable {
    fn title(&self) -> &str;

    fn excerpt(&self) -> &str {
        ""
    }

    fn content(&self) -> &str {
        ""
    }

    /// Normalized category key (lowercase, trimmed).
    fn category_key(&self) -> String;

    fn tags(&self) -> &[String];

    fn published_at(&self) -> Option<DateTime<Utc>>;

    fn is_featured(&self) -> bool {
        false
    }

    fn views(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCategory {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsAuthor {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewsAuthor {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub category: NewsCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<NewsAuthor>,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Listable for NewsItem {
    fn title(&self) -> &str {
        &self.title
    }

    fn excerpt(&self) -> &str {
        &self.excerpt
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn category_key(&self) -> String {
        normalize_category(&self.category.slug)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_published_at)
    }

    fn is_featured(&self) -> bool {
        self.featured
    }

    fn views(&self) -> u64 {
        self.views_count
    }
}

/// A document or record on one of the registry pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
}

impl Listable for RegistryEntry {
    fn title(&self) -> &str {
        &self.title
    }

    fn excerpt(&self) -> &str {
        &self.description
    }

    fn category_key(&self) -> String {
        normalize_category(&self.category)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_published_at)
    }
}
