use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// One assignment of a batch of leads to a franchise phone. Rows are an
/// append-only ledger: they are never updated and survive deletion of the
/// server, franchise, or phone they reference.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct LeadDistribution {
    pub id: Uuid,
    pub date: NaiveDate,
    pub server_id: Uuid,
    pub franchise_id: Uuid,
    pub franchise_phone_id: Uuid,
    pub leads_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateLeadDistribution {
    pub date: NaiveDate,
    pub server_id: Uuid,
    pub franchise_id: Uuid,
    pub franchise_phone_id: Uuid,
    pub leads_count: i64,
}

/// A ledger row joined with the display names of its referents. The names are
/// optional because the referents may have been deleted since the row was
/// written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct LeadDistributionWithContext {
    #[serde(flatten)]
    #[sqlx(flatten)]
    #[ts(flatten)]
    pub distribution: LeadDistribution,
    pub server_name: Option<String>,
    pub franchise_name: Option<String>,
    pub phone_number: Option<String>,
}

impl std::ops::Deref for LeadDistributionWithContext {
    type Target = LeadDistribution;

    fn deref(&self) -> &Self::Target {
        &self.distribution
    }
}

impl std::ops::DerefMut for LeadDistributionWithContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.distribution
    }
}

/// Per-franchise aggregate of one day of the ledger.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct FranchiseDailyTotal {
    pub franchise_id: Uuid,
    pub franchise_name: Option<String>,
    pub total_leads: i64,
    pub assignments: i64,
}

impl LeadDistribution {
    pub async fn create<'e, E>(
        executor: E,
        data: &CreateLeadDistribution,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, LeadDistribution>(
            r#"INSERT INTO lead_distributions (id, date, server_id, franchise_id, franchise_phone_id, leads_count)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, date, server_id, franchise_id, franchise_phone_id, leads_count, created_at"#,
        )
        .bind(id)
        .bind(data.date)
        .bind(data.server_id)
        .bind(data.franchise_id)
        .bind(data.franchise_phone_id)
        .bind(data.leads_count)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LeadDistribution>(
            r#"SELECT id, date, server_id, franchise_id, franchise_phone_id, leads_count, created_at
               FROM lead_distributions
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Ledger rows for one day, newest first, optionally narrowed by server
    /// and/or franchise. Both filters are conjunctive when present.
    pub async fn find_by_date(
        pool: &SqlitePool,
        date: NaiveDate,
        server_id: Option<Uuid>,
        franchise_id: Option<Uuid>,
    ) -> Result<Vec<LeadDistributionWithContext>, sqlx::Error> {
        sqlx::query_as::<_, LeadDistributionWithContext>(
            r#"SELECT ld.id, ld.date, ld.server_id, ld.franchise_id, ld.franchise_phone_id,
                      ld.leads_count, ld.created_at,
                      s.name AS server_name,
                      f.name AS franchise_name,
                      fp.phone_number AS phone_number
               FROM lead_distributions ld
               LEFT JOIN servers s ON s.id = ld.server_id
               LEFT JOIN franchises f ON f.id = ld.franchise_id
               LEFT JOIN franchise_phones fp ON fp.id = ld.franchise_phone_id
               WHERE ld.date = $1
                 AND ($2 IS NULL OR ld.server_id = $2)
                 AND ($3 IS NULL OR ld.franchise_id = $3)
               ORDER BY ld.created_at DESC, ld.id DESC"#,
        )
        .bind(date)
        .bind(server_id)
        .bind(franchise_id)
        .fetch_all(pool)
        .await
    }

    /// Per-franchise totals for one day, busiest franchise first.
    pub async fn totals_for_date(
        pool: &SqlitePool,
        date: NaiveDate,
    ) -> Result<Vec<FranchiseDailyTotal>, sqlx::Error> {
        sqlx::query_as::<_, FranchiseDailyTotal>(
            r#"SELECT ld.franchise_id,
                      f.name AS franchise_name,
                      COALESCE(SUM(ld.leads_count), 0) AS total_leads,
                      COUNT(*) AS assignments
               FROM lead_distributions ld
               LEFT JOIN franchises f ON f.id = ld.franchise_id
               WHERE ld.date = $1
               GROUP BY ld.franchise_id
               ORDER BY total_leads DESC, franchise_name ASC"#,
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::{
            franchise::{CreateFranchise, Franchise},
            franchise_phone::{CreateFranchisePhone, FranchisePhone},
            server::{CreateServer, Server},
        },
    };

    struct Fixture {
        db: DBService,
        server: Server,
        franchise: Franchise,
        phone: FranchisePhone,
    }

    async fn setup() -> Fixture {
        let db = DBService::new_in_memory().await.expect("in-memory db");
        let server = Server::create(
            &db.pool,
            &CreateServer {
                name: "landing-es".to_string(),
            },
        )
        .await
        .unwrap();
        let franchise = Franchise::create(
            &db.pool,
            &CreateFranchise {
                name: "Madrid Centro".to_string(),
            },
        )
        .await
        .unwrap();
        let phone = FranchisePhone::create(
            &db.pool,
            &CreateFranchisePhone {
                franchise_id: franchise.id,
                phone_number: "+34 600 000 001".to_string(),
                is_active: None,
                order_number: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        Fixture {
            db,
            server,
            franchise,
            phone,
        }
    }

    fn entry(fixture: &Fixture, date: NaiveDate, leads_count: i64) -> CreateLeadDistribution {
        CreateLeadDistribution {
            date,
            server_id: fixture.server.id,
            franchise_id: fixture.franchise.id,
            franchise_phone_id: fixture.phone.id,
            leads_count,
        }
    }

    #[tokio::test]
    async fn test_find_by_date_joins_display_names() {
        let fixture = setup().await;
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        LeadDistribution::create(&fixture.db.pool, &entry(&fixture, date, 5))
            .await
            .unwrap();

        let rows = LeadDistribution::find_by_date(&fixture.db.pool, date, None, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].leads_count, 5);
        assert_eq!(rows[0].server_name.as_deref(), Some("landing-es"));
        assert_eq!(rows[0].franchise_name.as_deref(), Some("Madrid Centro"));
        assert_eq!(rows[0].phone_number.as_deref(), Some("+34 600 000 001"));
    }

    #[tokio::test]
    async fn test_ledger_rows_survive_referent_deletion() {
        let fixture = setup().await;
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        LeadDistribution::create(&fixture.db.pool, &entry(&fixture, date, 3))
            .await
            .unwrap();

        // Deleting the franchise cascades to its phones but must leave the
        // ledger untouched.
        sqlx::query("DELETE FROM franchises WHERE id = $1")
            .bind(fixture.franchise.id)
            .execute(&fixture.db.pool)
            .await
            .unwrap();

        let rows = LeadDistribution::find_by_date(&fixture.db.pool, date, None, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].franchise_id, fixture.franchise.id);
        assert_eq!(rows[0].franchise_name, None);
        assert_eq!(rows[0].phone_number, None);
        assert_eq!(rows[0].server_name.as_deref(), Some("landing-es"));
    }

    #[tokio::test]
    async fn test_totals_for_date_aggregates_per_franchise() {
        let fixture = setup().await;
        let other = Franchise::create(
            &fixture.db.pool,
            &CreateFranchise {
                name: "Valencia".to_string(),
            },
        )
        .await
        .unwrap();
        let other_phone = FranchisePhone::create(
            &fixture.db.pool,
            &CreateFranchisePhone {
                franchise_id: other.id,
                phone_number: "+34 600 000 002".to_string(),
                is_active: None,
                order_number: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        LeadDistribution::create(&fixture.db.pool, &entry(&fixture, date, 4))
            .await
            .unwrap();
        LeadDistribution::create(&fixture.db.pool, &entry(&fixture, date, 6))
            .await
            .unwrap();
        LeadDistribution::create(
            &fixture.db.pool,
            &CreateLeadDistribution {
                date,
                server_id: fixture.server.id,
                franchise_id: other.id,
                franchise_phone_id: other_phone.id,
                leads_count: 2,
            },
        )
        .await
        .unwrap();
        // A different day must not leak into the aggregate.
        LeadDistribution::create(
            &fixture.db.pool,
            &entry(&fixture, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(), 50),
        )
        .await
        .unwrap();

        let totals = LeadDistribution::totals_for_date(&fixture.db.pool, date)
            .await
            .unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].franchise_id, fixture.franchise.id);
        assert_eq!(totals[0].total_leads, 10);
        assert_eq!(totals[0].assignments, 2);
        assert_eq!(totals[1].franchise_id, other.id);
        assert_eq!(totals[1].total_leads, 2);
        assert_eq!(totals[1].assignments, 1);
    }
}
