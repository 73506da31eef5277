use chrono::{NaiveDate, Utc};
use db::{
    DBService,
    models::{
        franchise::Franchise,
        franchise_phone::FranchisePhone,
        lead_distribution::{
            CreateLeadDistribution, FranchiseDailyTotal, LeadDistribution,
            LeadDistributionWithContext,
        },
    },
};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("invalid franchise id")]
    InvalidFranchiseId,
    #[error("franchise {0} not found")]
    FranchiseNotFound(Uuid),
    #[error("no active phones for franchise {0}")]
    NoActivePhones(Uuid),
    #[error("franchise phone {0} not found")]
    PhoneNotFound(Uuid),
    #[error("no franchise with an active phone")]
    NoEligibleFranchise,
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// How the writer picks a destination phone among a franchise's active ones.
///
/// `FirstActive` is the historical behavior: lowest phone id wins, load and
/// `order_number` are ignored. `LeastLoaded` picks the active phone with the
/// fewest leads assigned today, ties broken by `order_number`, then id.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, TS,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PhoneSelectionStrategy {
    #[default]
    FirstActive,
    LeastLoaded,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AssignLeads {
    pub server_id: Uuid,
    pub franchise_id: Uuid,
    pub leads_count: i64,
    /// Defaults to the current UTC date when omitted.
    pub date: Option<NaiveDate>,
    /// Overrides the service default when present.
    pub strategy: Option<PhoneSelectionStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SelectedPhone {
    pub phone_id: Uuid,
    pub phone_number: String,
}

impl From<FranchisePhone> for SelectedPhone {
    fn from(phone: FranchisePhone) -> Self {
        Self {
            phone_id: phone.id,
            phone_number: phone.phone_number,
        }
    }
}

/// Assigns incoming leads to franchise phones and reads the resulting ledger.
#[derive(Clone)]
pub struct DistributionService {
    db: DBService,
    default_strategy: PhoneSelectionStrategy,
}

impl DistributionService {
    pub fn new(db: DBService) -> Self {
        Self::with_default_strategy(db, PhoneSelectionStrategy::default())
    }

    pub fn with_default_strategy(db: DBService, default_strategy: PhoneSelectionStrategy) -> Self {
        Self {
            db,
            default_strategy,
        }
    }

    /// The phone that would receive the next batch for `franchise_id`,
    /// without writing anything.
    ///
    /// An unknown franchise is indistinguishable from one whose phones are
    /// all inactive; both report `NoActivePhones`.
    pub async fn next_phone(
        &self,
        franchise_id: Uuid,
        strategy: Option<PhoneSelectionStrategy>,
    ) -> Result<SelectedPhone, DistributionError> {
        let strategy = strategy.unwrap_or(self.default_strategy);
        let date = Utc::now().date_naive();
        let phone = Self::select_phone(&self.db.pool, strategy, franchise_id, date)
            .await?
            .ok_or(DistributionError::NoActivePhones(franchise_id))?;
        Ok(SelectedPhone::from(phone))
    }

    /// Assign `leads_count` leads from a server to one of the franchise's
    /// active phones and record the assignment in the ledger.
    ///
    /// The whole read-validate-write sequence runs in one transaction, so a
    /// phone deactivated concurrently can no longer end up referenced by a
    /// row written after the validation read. Each call appends a new row;
    /// repeating a call with identical arguments appends again.
    pub async fn assign_leads(
        &self,
        data: &AssignLeads,
    ) -> Result<LeadDistribution, DistributionError> {
        if data.franchise_id.is_nil() {
            return Err(DistributionError::InvalidFranchiseId);
        }
        let date = data.date.unwrap_or_else(|| Utc::now().date_naive());
        let strategy = data.strategy.unwrap_or(self.default_strategy);

        let mut tx = self.db.pool.begin().await?;

        let franchise = Franchise::find_by_id(&mut *tx, data.franchise_id)
            .await?
            .ok_or(DistributionError::FranchiseNotFound(data.franchise_id))?;

        let selected = Self::select_phone(&mut *tx, strategy, franchise.id, date)
            .await?
            .ok_or(DistributionError::NoActivePhones(franchise.id))?;

        // The ledger has no foreign keys; the phone row is checked once more
        // immediately before the insert.
        let phone = FranchisePhone::find_by_id(&mut *tx, selected.id)
            .await?
            .ok_or(DistributionError::PhoneNotFound(selected.id))?;

        let mut missing = Vec::new();
        if data.server_id.is_nil() {
            missing.push("server_id");
        }
        if franchise.id.is_nil() {
            missing.push("franchise_id");
        }
        if phone.id.is_nil() {
            missing.push("franchise_phone_id");
        }
        if !missing.is_empty() {
            return Err(DistributionError::MissingFields(missing));
        }

        let distribution = LeadDistribution::create(
            &mut *tx,
            &CreateLeadDistribution {
                date,
                server_id: data.server_id,
                franchise_id: franchise.id,
                franchise_phone_id: phone.id,
                leads_count: data.leads_count,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            distribution_id = %distribution.id,
            franchise_id = %distribution.franchise_id,
            franchise_phone_id = %distribution.franchise_phone_id,
            leads_count = distribution.leads_count,
            date = %distribution.date,
            "assigned leads to franchise phone"
        );

        Ok(distribution)
    }

    /// Ledger rows for `date`, optionally narrowed by server and franchise.
    pub async fn distributions_for_date(
        &self,
        date: NaiveDate,
        server_id: Option<Uuid>,
        franchise_id: Option<Uuid>,
    ) -> Result<Vec<LeadDistributionWithContext>, DistributionError> {
        Ok(LeadDistribution::find_by_date(&self.db.pool, date, server_id, franchise_id).await?)
    }

    /// Per-franchise totals for `date`.
    pub async fn daily_summary(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<FranchiseDailyTotal>, DistributionError> {
        Ok(LeadDistribution::totals_for_date(&self.db.pool, date).await?)
    }

    /// The franchise that should receive the next fresh lead: least loaded
    /// on `date` (today when omitted) among franchises that have at least
    /// one active phone.
    pub async fn next_franchise(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Franchise, DistributionError> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        Franchise::find_least_loaded(&self.db.pool, date)
            .await?
            .ok_or(DistributionError::NoEligibleFranchise)
    }

    async fn select_phone<'e, E>(
        executor: E,
        strategy: PhoneSelectionStrategy,
        franchise_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<FranchisePhone>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        match strategy {
            PhoneSelectionStrategy::FirstActive => {
                FranchisePhone::find_first_active(executor, franchise_id).await
            }
            PhoneSelectionStrategy::LeastLoaded => {
                FranchisePhone::find_least_loaded(executor, franchise_id, date).await
            }
        }
    }
}
