//! pgvector (PostgreSQL) vector index backend.
//!
//! Provides [`PgVectorIndex`] which implements [`VectorIndex`] using
//! [sqlx](https://docs.rs/sqlx) with the
//! [pgvector](https://github.com/pgvector/pgvector) PostgreSQL extension.
//!
//! Rebuilds run pre-delete-then-insert inside one transaction, so readers
//! see either the fully-old or fully-new collection. A registry table
//! (`cv_collections`) records each collection's dimensionality and embedder
//! fingerprint.
//!
//! # Prerequisites
//!
//! - PostgreSQL with the `pgvector` extension installed
//! - The extension must be created: `CREATE EXTENSION IF NOT EXISTS vector;`

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::document::{Chunk, CollectionMeta, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// A [`VectorIndex`] backed by PostgreSQL with the pgvector extension.
///
/// Each collection is stored as a separate table with columns:
/// `id`, `text`, `seq`, `page`, `embedding` (vector), `document_id`.
pub struct PgVectorIndex {
    pool: PgPool,
}

impl PgVectorIndex {
    /// Create a new pgvector index by connecting to the given database URL.
    pub async fn connect(database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(5).connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Create a new pgvector index from an existing connection pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_err(e: sqlx::Error) -> RagError {
        RagError::VectorIndex { backend: "pgvector".to_string(), message: e.to_string() }
    }

    /// Sanitize a collection key for use as a table name.
    /// Only allows alphanumeric characters and underscores.
    fn table_name(collection: &str) -> Result<String> {
        let sanitized: String = collection
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if sanitized.is_empty() {
            return Err(RagError::VectorIndex {
                backend: "pgvector".to_string(),
                message: "collection key is empty after sanitization".to_string(),
            });
        }
        Ok(format!("cv_{sanitized}"))
    }

    /// pgvector expects the vector as a string like '[1.0,2.0,3.0]'.
    fn vector_literal(embedding: &[f32]) -> String {
        format!("[{}]", embedding.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","))
    }

    async fn ensure_registry(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cv_collections (\
                collection TEXT PRIMARY KEY, \
                dimensions INTEGER NOT NULL, \
                embedder TEXT NOT NULL\
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_err)?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn rebuild(
        &self,
        collection: &str,
        meta: CollectionMeta,
        chunks: &[Chunk],
    ) -> Result<()> {
        let table = Self::table_name(collection)?;
        self.ensure_registry().await?;

        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(Self::map_err)?;

        let create_sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                id TEXT PRIMARY KEY, \
                text TEXT NOT NULL, \
                seq INTEGER NOT NULL, \
                page INTEGER NOT NULL, \
                embedding vector({dims}), \
                document_id TEXT NOT NULL\
            )",
            dims = meta.dimensions
        );
        sqlx::query(&create_sql).execute(&self.pool).await.map_err(Self::map_err)?;

        // Pre-delete-then-insert inside one transaction: all-or-nothing.
        let mut tx = self.pool.begin().await.map_err(Self::map_err)?;

        let delete_sql = format!("DELETE FROM {table}");
        sqlx::query(&delete_sql).execute(&mut *tx).await.map_err(Self::map_err)?;

        let insert_sql = format!(
            "INSERT INTO {table} (id, text, seq, page, embedding, document_id) \
             VALUES ($1, $2, $3, $4, $5::vector, $6)"
        );
        for chunk in chunks {
            sqlx::query(&insert_sql)
                .bind(&chunk.id)
                .bind(&chunk.text)
                .bind(chunk.position as i32)
                .bind(chunk.page as i32)
                .bind(Self::vector_literal(&chunk.embedding))
                .bind(&chunk.document_id)
                .execute(&mut *tx)
                .await
                .map_err(Self::map_err)?;
        }

        sqlx::query(
            "INSERT INTO cv_collections (collection, dimensions, embedder) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (collection) DO UPDATE SET \
                dimensions = EXCLUDED.dimensions, \
                embedder = EXCLUDED.embedder",
        )
        .bind(collection)
        .bind(meta.dimensions as i32)
        .bind(&meta.embedder)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_err)?;

        tx.commit().await.map_err(Self::map_err)?;

        debug!(collection, table = %table, count = chunks.len(), "rebuilt pgvector collection");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        // Existence check goes through the registry so an absent collection
        // is a typed error rather than a SQL failure.
        self.collection_meta(collection).await?;

        let table = Self::table_name(collection)?;

        // pgvector cosine distance operator: <=>
        // Returns distance (0 = identical), so score = 1 - distance.
        let search_sql = format!(
            "SELECT id, text, seq, page, document_id, \
                    1 - (embedding <=> $1::vector) AS score \
             FROM {table} \
             ORDER BY embedding <=> $1::vector \
             LIMIT $2"
        );

        let rows = sqlx::query(&search_sql)
            .bind(Self::vector_literal(embedding))
            .bind(top_k as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_err)?;

        let results = rows
            .iter()
            .map(|row| {
                let position: i32 = row.get("seq");
                let page: i32 = row.get("page");
                let score: f64 = row.get("score");
                SearchResult {
                    chunk: Chunk {
                        id: row.get("id"),
                        text: row.get("text"),
                        position: position as usize,
                        page: page as u32,
                        embedding: vec![],
                        document_id: row.get("document_id"),
                    },
                    score: score as f32,
                }
            })
            .collect();

        Ok(results)
    }

    async fn collection_meta(&self, collection: &str) -> Result<CollectionMeta> {
        self.ensure_registry().await?;

        let row = sqlx::query(
            "SELECT dimensions, embedder FROM cv_collections WHERE collection = $1",
        )
        .bind(collection)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_err)?;

        let row = row.ok_or_else(|| RagError::CollectionNotFound {
            collection: collection.to_string(),
        })?;
        let dimensions: i32 = row.get("dimensions");
        Ok(CollectionMeta { dimensions: dimensions as usize, embedder: row.get("embedder") })
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        let table = Self::table_name(collection)?;
        self.ensure_registry().await?;

        let mut tx = self.pool.begin().await.map_err(Self::map_err)?;
        let drop_sql = format!("DROP TABLE IF EXISTS {table}");
        sqlx::query(&drop_sql).execute(&mut *tx).await.map_err(Self::map_err)?;
        sqlx::query("DELETE FROM cv_collections WHERE collection = $1")
            .bind(collection)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_err)?;
        tx.commit().await.map_err(Self::map_err)?;

        debug!(collection, table = %table, "dropped pgvector collection");
        Ok(())
    }
}
