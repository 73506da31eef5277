use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A phone number owned by a franchise. `is_active` gates assignment
/// eligibility; `order_number` is a manual priority used for display and as
/// the least-loaded tie-break.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FranchisePhone {
    pub id: Uuid,
    pub franchise_id: Uuid,
    pub phone_number: String,
    pub is_active: bool,
    pub order_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFranchisePhone {
    pub franchise_id: Uuid,
    pub phone_number: String,
    pub is_active: Option<bool>,
    pub order_number: Option<i64>,
}

const PHONE_COLUMNS: &str =
    "id, franchise_id, phone_number, is_active, order_number, created_at, updated_at";

impl FranchisePhone {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateFranchisePhone,
        phone_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let is_active = data.is_active.unwrap_or(true);
        let order_number = data.order_number.unwrap_or(0);
        sqlx::query_as::<_, FranchisePhone>(&format!(
            r#"INSERT INTO franchise_phones (id, franchise_id, phone_number, is_active, order_number)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {PHONE_COLUMNS}"#
        ))
        .bind(phone_id)
        .bind(data.franchise_id)
        .bind(&data.phone_number)
        .bind(is_active)
        .bind(order_number)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, FranchisePhone>(&format!(
            r#"SELECT {PHONE_COLUMNS}
               FROM franchise_phones
               WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// All phones of a franchise in manual display order.
    pub async fn find_by_franchise_id(
        pool: &SqlitePool,
        franchise_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FranchisePhone>(&format!(
            r#"SELECT {PHONE_COLUMNS}
               FROM franchise_phones
               WHERE franchise_id = $1
               ORDER BY order_number ASC, id ASC"#
        ))
        .bind(franchise_id)
        .fetch_all(pool)
        .await
    }

    /// First active phone in id order. This is the legacy application-path
    /// selector; it ignores both `order_number` and current load.
    pub async fn find_first_active<'e, E>(
        executor: E,
        franchise_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, FranchisePhone>(&format!(
            r#"SELECT {PHONE_COLUMNS}
               FROM franchise_phones
               WHERE franchise_id = $1 AND is_active = 1
               ORDER BY id ASC
               LIMIT 1"#
        ))
        .bind(franchise_id)
        .fetch_optional(executor)
        .await
    }

    /// Active phone with the fewest leads assigned on `date`, ties broken by
    /// `order_number`, then id. Mirrors the legacy `get_next_franchise_phone`
    /// SQL function.
    pub async fn find_least_loaded<'e, E>(
        executor: E,
        franchise_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, FranchisePhone>(
            r#"SELECT fp.id, fp.franchise_id, fp.phone_number, fp.is_active, fp.order_number,
                      fp.created_at, fp.updated_at
               FROM franchise_phones fp
               LEFT JOIN lead_distributions ld
                 ON ld.franchise_phone_id = fp.id AND ld.date = $2
               WHERE fp.franchise_id = $1 AND fp.is_active = 1
               GROUP BY fp.id
               ORDER BY COALESCE(SUM(ld.leads_count), 0) ASC, fp.order_number ASC, fp.id ASC
               LIMIT 1"#,
        )
        .bind(franchise_id)
        .bind(date)
        .fetch_optional(executor)
        .await
    }

    /// Flip the activation flag. Returns the updated row, or `None` when the
    /// phone does not exist.
    pub async fn set_active(
        pool: &SqlitePool,
        id: Uuid,
        is_active: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FranchisePhone>(&format!(
            r#"UPDATE franchise_phones
               SET is_active = $2, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {PHONE_COLUMNS}"#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_order_number(
        pool: &SqlitePool,
        id: Uuid,
        order_number: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FranchisePhone>(&format!(
            r#"UPDATE franchise_phones
               SET order_number = $2, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {PHONE_COLUMNS}"#
        ))
        .bind(id)
        .bind(order_number)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DBService, models::franchise::{CreateFranchise, Franchise}};

    async fn setup() -> (DBService, Franchise) {
        let db = DBService::new_in_memory().await.expect("in-memory db");
        let franchise = Franchise::create(
            &db.pool,
            &CreateFranchise {
                name: "Madrid Centro".to_string(),
            },
        )
        .await
        .unwrap();
        (db, franchise)
    }

    fn phone(franchise_id: Uuid, number: &str, order_number: i64) -> CreateFranchisePhone {
        CreateFranchisePhone {
            franchise_id,
            phone_number: number.to_string(),
            is_active: None,
            order_number: Some(order_number),
        }
    }

    #[tokio::test]
    async fn test_find_by_franchise_id_orders_by_order_number() {
        let (db, franchise) = setup().await;

        FranchisePhone::create(&db.pool, &phone(franchise.id, "+34 600 000 002", 2), Uuid::from_u128(9))
            .await
            .unwrap();
        FranchisePhone::create(&db.pool, &phone(franchise.id, "+34 600 000 001", 1), Uuid::from_u128(5))
            .await
            .unwrap();

        let phones = FranchisePhone::find_by_franchise_id(&db.pool, franchise.id)
            .await
            .unwrap();
        let numbers: Vec<&str> = phones.iter().map(|p| p.phone_number.as_str()).collect();
        assert_eq!(numbers, vec!["+34 600 000 001", "+34 600 000 002"]);
    }

    #[tokio::test]
    async fn test_set_active_returns_updated_row() {
        let (db, franchise) = setup().await;
        let created =
            FranchisePhone::create(&db.pool, &phone(franchise.id, "+34 600 000 001", 0), Uuid::new_v4())
                .await
                .unwrap();
        assert!(created.is_active);

        let updated = FranchisePhone::set_active(&db.pool, created.id, false)
            .await
            .unwrap()
            .expect("phone exists");
        assert!(!updated.is_active);

        let missing = FranchisePhone::set_active(&db.pool, Uuid::new_v4(), true)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_created_phone_defaults_to_active_order_zero() {
        let (db, franchise) = setup().await;
        let created = FranchisePhone::create(
            &db.pool,
            &CreateFranchisePhone {
                franchise_id: franchise.id,
                phone_number: "+34 600 000 009".to_string(),
                is_active: None,
                order_number: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        assert!(created.is_active);
        assert_eq!(created.order_number, 0);
    }
}
