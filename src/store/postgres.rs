use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, warn};

use super::{collection_key, DocumentStore, Filter, Record, StoreError};

/// Documents kept as JSONB rows in a single `documents` table, keyed by
/// collection path and id.
#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// Filters folded into one JSONB containment document. Containment on
/// top-level scalars is exact equality.
fn containment(filters: &[Filter]) -> Value {
    let map: Map<String, Value> = filters
        .iter()
        .map(|f| (f.field.clone(), f.value.clone()))
        .collect();
    Value::Object(map)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn query(&self, path: &str, filters: &[Filter]) -> Result<Vec<Record>, StoreError> {
        let collection = collection_key(path);
        let rows = sqlx::query_as::<_, (String, Value)>(
            r#"
            SELECT id, data
              FROM documents
             WHERE collection = $1
               AND data @> $2
             ORDER BY seq ASC
            "#,
        )
        .bind(collection)
        .bind(containment(filters))
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, %collection, "document query failed");
            StoreError::Unavailable(e.to_string())
        })?;

        let records = rows
            .into_iter()
            .filter_map(|(id, data)| match data {
                Value::Object(data) => Some(Record { id, data }),
                _ => {
                    warn!(%collection, %id, "skipping non-object document");
                    None
                }
            })
            .collect();
        Ok(records)
    }
}
