use super::{DocumentStore, Precondition, Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    migrate::Migrator,
    postgres::{PgPoolOptions, PgRow, Postgres},
    types::Json,
    Pool, Row,
};

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Documents kept as JSONB rows of the `documents` table, keyed by name.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        MIGRATOR.run(&pool).await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_one(&self, name: &str) -> Result<Option<Value>> {
        let body = sqlx::query("SELECT body FROM documents WHERE name = $1")
            .bind(name)
            .map(|row: PgRow| row.get::<Json<Value>, _>(0))
            .fetch_optional(&self.pool)
            .await?;

        Ok(body.map(|Json(body)| body))
    }

    /// The precondition is evaluated by the same statement that writes, so two
    /// concurrent writers guarded on the same value cannot both succeed.
    async fn upsert(&self, name: &str, body: Value, precondition: Precondition) -> Result<()> {
        let result = match &precondition {
            Precondition::None => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (name, body)
                    VALUES ($1, $2)
                    ON CONFLICT (name) DO UPDATE
                        SET body = EXCLUDED.body, updated_at = CURRENT_TIMESTAMP;
                    "#,
                )
                .bind(name)
                .bind(Json(&body))
                .execute(&self.pool)
                .await?
            }
            Precondition::FieldEquals { field, expected } => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (name, body)
                    VALUES ($1, $2)
                    ON CONFLICT (name) DO UPDATE
                        SET body = EXCLUDED.body, updated_at = CURRENT_TIMESTAMP
                        WHERE documents.body ->> $3::text IS NOT DISTINCT FROM $4;
                    "#,
                )
                .bind(name)
                .bind(Json(&body))
                .bind(field)
                .bind(expected)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            tracing::warn!("precondition {:?} failed for document `{}`", precondition, name);
            return Err(StoreError::Conflict(name.to_string()));
        }

        Ok(())
    }
}
