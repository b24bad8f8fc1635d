//! Example Store: the two persisted collections of reference writing.
//!
//! Both collections live in one SQLite table but every statement is scoped by
//! collection name, so they share no state. Similarity search is brute-force
//! cosine over the stored embeddings of one collection.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::embedding::{cosine_similarity, decode_vector, encode_vector, Embedder, EmbeddingError};
use crate::models::example::{
    CreatorExample, CreatorGroup, CreatorSummary, ExampleRow, Metadata, NewCreatorExample,
    NewStyleExample, StoredExample,
};

pub mod handlers;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Corrupt metadata for {id}: {source}")]
    Metadata {
        id: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    MyStyle,
    FavoriteCreators,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::MyStyle => "my_content_style",
            Collection::FavoriteCreators => "favorite_creators",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            Collection::MyStyle => "my_style",
            Collection::FavoriteCreators => "creator",
        }
    }

    /// Metadata fields that must be non-empty for an entry to be persisted.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::MyStyle => &["title"],
            Collection::FavoriteCreators => &["creator_name", "content_title"],
        }
    }
}

/// "Field value is one of" restriction applied to a similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFilter {
    pub field: String,
    pub any_of: Vec<String>,
}

impl MetadataFilter {
    pub fn new(field: &str, any_of: Vec<String>) -> Self {
        Self {
            field: field.to_string(),
            any_of,
        }
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        metadata
            .get(&self.field)
            .is_some_and(|value| self.any_of.iter().any(|v| v == value))
    }
}

#[derive(Debug, Clone)]
pub struct QueryHit {
    pub example: StoredExample,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(StoredExample),
    /// Nothing was written; lists the fields that were empty.
    Rejected { missing_fields: Vec<&'static str> },
}

#[derive(Clone)]
pub struct ExampleStore {
    pool: SqlitePool,
    embedder: Arc<dyn Embedder>,
}

impl ExampleStore {
    pub fn new(pool: SqlitePool, embedder: Arc<dyn Embedder>) -> Self {
        Self { pool, embedder }
    }

    /// Name of the embedder behind similarity queries.
    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Validates, embeds and appends a new entry.
    pub async fn add(
        &self,
        collection: Collection,
        text: &str,
        metadata: Metadata,
    ) -> Result<AddOutcome, StoreError> {
        let mut missing_fields: Vec<&'static str> = collection
            .required_fields()
            .iter()
            .copied()
            .filter(|field| metadata.get(*field).map_or(true, |v| v.trim().is_empty()))
            .collect();
        if text.trim().is_empty() {
            missing_fields.push("text");
        }
        if !missing_fields.is_empty() {
            debug!(
                "Rejected save into {}: missing {:?}",
                collection.name(),
                missing_fields
            );
            return Ok(AddOutcome::Rejected { missing_fields });
        }

        let embedding = self.embedder.embed_one(text).await?;
        let example = StoredExample {
            id: format!("{}_{}", collection.id_prefix(), Uuid::new_v4().simple()),
            document: text.to_string(),
            metadata,
            created_at: Utc::now(),
        };
        let metadata_json =
            serde_json::to_string(&example.metadata).map_err(|source| StoreError::Metadata {
                id: example.id.clone(),
                source,
            })?;

        sqlx::query(
            r#"
            INSERT INTO examples (collection, id, document, metadata, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(collection.name())
        .bind(&example.id)
        .bind(&example.document)
        .bind(&metadata_json)
        .bind(encode_vector(&embedding))
        .bind(example.created_at)
        .execute(&self.pool)
        .await?;

        info!("Saved {} into {}", example.id, collection.name());
        Ok(AddOutcome::Added(example))
    }

    pub async fn save_style_example(
        &self,
        request: &NewStyleExample,
    ) -> Result<AddOutcome, StoreError> {
        self.add(Collection::MyStyle, &request.text, request.metadata())
            .await
    }

    pub async fn save_creator_example(
        &self,
        request: &NewCreatorExample,
    ) -> Result<AddOutcome, StoreError> {
        self.add(Collection::FavoriteCreators, &request.text, request.metadata())
            .await
    }

    /// Every entry of the collection, oldest first.
    pub async fn list_all(&self, collection: Collection) -> Result<Vec<StoredExample>, StoreError> {
        self.fetch_rows(collection)
            .await?
            .into_iter()
            .map(|row| row_to_example(row).map(|(example, _)| example))
            .collect()
    }

    pub async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<StoredExample>, StoreError> {
        let row = sqlx::query_as::<_, ExampleRow>(
            "SELECT id, document, metadata, embedding, created_at FROM examples \
             WHERE collection = ?1 AND id = ?2",
        )
        .bind(collection.name())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_example(r).map(|(example, _)| example))
            .transpose()
    }

    pub async fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM examples WHERE collection = ?1")
            .bind(collection.name())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Up to `k` entries most similar to `text`, best first.
    ///
    /// An empty collection, or a filter nothing satisfies, yields an empty
    /// result without calling the embedder.
    pub async fn query(
        &self,
        collection: Collection,
        text: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryHit>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let candidates: Vec<(StoredExample, Vec<f32>)> = self
            .fetch_rows(collection)
            .await?
            .into_iter()
            .map(row_to_example)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|(example, _)| filter.map_or(true, |f| f.matches(&example.metadata)))
            .collect();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let probe = self.embedder.embed_one(text).await?;

        let mut hits: Vec<QueryHit> = candidates
            .into_iter()
            .map(|(example, embedding)| QueryHit {
                score: cosine_similarity(&probe, &embedding),
                example,
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        debug!(
            "Query on {} returned {} hits",
            collection.name(),
            hits.len()
        );
        Ok(hits)
    }

    /// Removes the entry if present. Returns whether anything was deleted.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM examples WHERE collection = ?1 AND id = ?2")
            .bind(collection.name())
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted {} from {}", id, collection.name());
        }
        Ok(deleted)
    }

    /// Creator content grouped by creator, groups in order of first appearance.
    pub async fn list_grouped_by_creator(&self) -> Result<Vec<CreatorGroup>, StoreError> {
        let mut groups: Vec<CreatorGroup> = Vec::new();

        for example in self.list_all(Collection::FavoriteCreators).await? {
            let example = CreatorExample::from(example);
            match groups
                .iter_mut()
                .find(|g| g.creator_name == example.creator_name)
            {
                Some(group) => group.examples.push(example),
                None => groups.push(CreatorGroup {
                    creator_name: example.creator_name.clone(),
                    examples: vec![example],
                }),
            }
        }

        Ok(groups)
    }

    pub async fn creator_summaries(&self) -> Result<Vec<CreatorSummary>, StoreError> {
        Ok(self
            .list_grouped_by_creator()
            .await?
            .into_iter()
            .map(|g| CreatorSummary {
                example_count: g.examples.len(),
                creator_name: g.creator_name,
            })
            .collect())
    }

    async fn fetch_rows(&self, collection: Collection) -> Result<Vec<ExampleRow>, StoreError> {
        Ok(sqlx::query_as::<_, ExampleRow>(
            "SELECT id, document, metadata, embedding, created_at FROM examples \
             WHERE collection = ?1 ORDER BY seq ASC",
        )
        .bind(collection.name())
        .fetch_all(&self.pool)
        .await?)
    }
}

fn row_to_example(row: ExampleRow) -> Result<(StoredExample, Vec<f32>), StoreError> {
    let metadata: Metadata =
        serde_json::from_str(&row.metadata).map_err(|source| StoreError::Metadata {
            id: row.id.clone(),
            source,
        })?;
    let embedding = decode_vector(&row.embedding);

    Ok((
        StoredExample {
            id: row.id,
            document: row.document,
            metadata,
            created_at: row.created_at,
        },
        embedding,
    ))
}
