use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// An ad server / lead source. Ledger rows reference a server, but the
/// writer only ever checks that the id is non-nil.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Server {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateServer {
    pub name: String,
}

impl Server {
    pub async fn create(pool: &SqlitePool, data: &CreateServer) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Server>(
            r#"INSERT INTO servers (id, name)
               VALUES ($1, $2)
               RETURNING id, name, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Server>(
            r#"SELECT id, name, created_at, updated_at
               FROM servers
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Server>(
            r#"SELECT id, name, created_at, updated_at
               FROM servers
               ORDER BY name ASC, id ASC"#,
        )
        .fetch_all(pool)
        .await
    }
}
