use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

use crate::{
    db::DbPool,
    error::AppError,
    identity::Owner,
    models::{
        expense::{ExpenseCategory, ExpenseInput, ExpenseRecord},
        itinerary::Itinerary,
        plan::PlanRecord,
        trip::TripRequest,
    },
    services::storage::TravelStore,
};

#[derive(Clone)]
pub struct SqliteStore {
    db: DbPool,
}

impl SqliteStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct PlanRow {
    id: String,
    user_id: String,
    request: Json<TripRequest>,
    itinerary: Json<Itinerary>,
    created_at: DateTime<Utc>,
}

impl From<PlanRow> for PlanRecord {
    fn from(row: PlanRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            request: row.request.0,
            itinerary: row.itinerary.0,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ExpenseRow {
    id: String,
    user_id: String,
    category: String,
    amount: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ExpenseRow> for ExpenseRecord {
    fn from(row: ExpenseRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            category: ExpenseCategory::from(row.category),
            amount: row.amount,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl TravelStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn save_plan(
        &self,
        owner: &Owner,
        request: TripRequest,
        itinerary: Itinerary,
    ) -> Result<PlanRecord, AppError> {
        let record = PlanRecord::new(owner.as_str(), request, itinerary);
        sqlx::query(
            "INSERT INTO plans (id, user_id, request, itinerary, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(Json(&record.request))
        .bind(Json(&record.itinerary))
        .bind(record.created_at)
        .execute(&self.db)
        .await?;
        Ok(record)
    }

    async fn list_plans(&self, owner: &Owner) -> Result<Vec<PlanRecord>, AppError> {
        let rows: Vec<PlanRow> = sqlx::query_as(
            "SELECT id, user_id, request, itinerary, created_at FROM plans WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(owner.as_str())
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(PlanRecord::from).collect())
    }

    async fn find_plan(&self, owner: &Owner, id: &str) -> Result<Option<PlanRecord>, AppError> {
        let row: Option<PlanRow> = sqlx::query_as(
            "SELECT id, user_id, request, itinerary, created_at FROM plans WHERE user_id = ?1 AND id = ?2",
        )
        .bind(owner.as_str())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(PlanRecord::from))
    }

    async fn delete_plan(&self, owner: &Owner, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM plans WHERE user_id = ?1 AND id = ?2")
            .bind(owner.as_str())
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_expense(
        &self,
        owner: &Owner,
        input: ExpenseInput,
    ) -> Result<ExpenseRecord, AppError> {
        let record = ExpenseRecord::new(owner.as_str(), input);
        sqlx::query(
            "INSERT INTO expenses (id, user_id, category, amount, notes, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(record.category.as_str())
        .bind(record.amount)
        .bind(&record.notes)
        .bind(record.created_at)
        .execute(&self.db)
        .await?;
        Ok(record)
    }

    async fn list_expenses(&self, owner: &Owner) -> Result<Vec<ExpenseRecord>, AppError> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            "SELECT id, user_id, category, amount, notes, created_at FROM expenses WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(owner.as_str())
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ExpenseRecord::from).collect())
    }
}
