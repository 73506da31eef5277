use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A business unit that receives distributed leads.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Franchise {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFranchise {
    pub name: String,
}

impl Franchise {
    pub async fn create(pool: &SqlitePool, data: &CreateFranchise) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Franchise>(
            r#"INSERT INTO franchises (id, name)
               VALUES ($1, $2)
               RETURNING id, name, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Franchise>(
            r#"SELECT id, name, created_at, updated_at
               FROM franchises
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Franchise>(
            r#"SELECT id, name, created_at, updated_at
               FROM franchises
               ORDER BY name ASC, id ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// The franchise that should receive the next batch: among franchises
    /// with at least one active phone, the one with the fewest leads on
    /// `date`. Ties broken by name, then id. Mirrors the legacy
    /// `get_next_franchise()` SQL function.
    pub async fn find_least_loaded(
        pool: &SqlitePool,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Franchise>(
            r#"SELECT f.id, f.name, f.created_at, f.updated_at
               FROM franchises f
               WHERE EXISTS (
                   SELECT 1 FROM franchise_phones fp
                   WHERE fp.franchise_id = f.id AND fp.is_active = 1
               )
               ORDER BY (
                   SELECT COALESCE(SUM(ld.leads_count), 0)
                   FROM lead_distributions ld
                   WHERE ld.franchise_id = f.id AND ld.date = $1
               ) ASC, f.name ASC, f.id ASC
               LIMIT 1"#,
        )
        .bind(date)
        .fetch_optional(pool)
        .await
    }
}
