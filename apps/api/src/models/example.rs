use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Free-form string metadata attached to every stored example.
pub type Metadata = BTreeMap<String, String>;

/// Raw row of the `examples` table.
#[derive(Debug, Clone, FromRow)]
pub struct ExampleRow {
    pub id: String,
    pub document: String,
    pub metadata: String,
    pub embedding: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// A stored example as returned by list and query calls.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredExample {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl StoredExample {
    pub fn field(&self, name: &str) -> &str {
        self.metadata.get(name).map(String::as_str).unwrap_or_default()
    }

    fn notes(&self) -> Option<String> {
        self.metadata
            .get("notes")
            .filter(|n| !n.trim().is_empty())
            .cloned()
    }
}

/// A piece of the user's own past writing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StyleExample {
    pub id: String,
    pub text: String,
    pub title: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredExample> for StyleExample {
    fn from(example: StoredExample) -> Self {
        Self {
            title: example.field("title").to_string(),
            notes: example.notes(),
            id: example.id,
            text: example.document,
            created_at: example.created_at,
        }
    }
}

/// An excerpt saved from a creator the user admires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatorExample {
    pub id: String,
    pub text: String,
    pub creator_name: String,
    pub content_title: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredExample> for CreatorExample {
    fn from(example: StoredExample) -> Self {
        Self {
            creator_name: example.field("creator_name").to_string(),
            content_title: example.field("content_title").to_string(),
            notes: example.notes(),
            id: example.id,
            text: example.document,
            created_at: example.created_at,
        }
    }
}

/// Request body for saving a style example.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStyleExample {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub notes: Option<String>,
}

impl NewStyleExample {
    pub fn metadata(&self) -> Metadata {
        Metadata::from([
            ("title".to_string(), self.title.trim().to_string()),
            ("notes".to_string(), self.notes.clone().unwrap_or_default()),
        ])
    }
}

/// Request body for saving a creator example.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCreatorExample {
    #[serde(default)]
    pub creator_name: String,
    #[serde(default)]
    pub content_title: String,
    #[serde(default)]
    pub text: String,
    pub notes: Option<String>,
}

impl NewCreatorExample {
    pub fn metadata(&self) -> Metadata {
        Metadata::from([
            ("creator_name".to_string(), self.creator_name.trim().to_string()),
            ("content_title".to_string(), self.content_title.trim().to_string()),
            ("notes".to_string(), self.notes.clone().unwrap_or_default()),
        ])
    }
}

/// All saved content of one creator, in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct CreatorGroup {
    pub creator_name: String,
    pub examples: Vec<CreatorExample>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreatorSummary {
    pub creator_name: String,
    pub example_count: usize,
}
