use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    identity::Owner,
    models::{
        expense::{normalize_optional, ExpenseCategory, ExpenseInput, ExpenseRecord},
        itinerary::Itinerary,
        plan::{PlanRecord, StoredPlan},
        trip::TripRequest,
    },
    services::storage::TravelStore,
};

const PLANS_TABLE: &str = "travel_plans";
const EXPENSES_TABLE: &str = "expenses";

/// Hosted Postgres tables reached through the PostgREST API.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    key: String,
}

#[derive(Deserialize)]
struct PlanRow {
    id: Value,
    user_id: String,
    plan: StoredPlan,
    created_at: DateTime<Utc>,
}

impl From<PlanRow> for PlanRecord {
    fn from(row: PlanRow) -> Self {
        Self {
            id: id_text(row.id),
            user_id: row.user_id,
            request: row.plan.request,
            itinerary: row.plan.itinerary,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredExpense {
    category: ExpenseCategory,
    amount: f64,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
struct ExpenseRow {
    id: Value,
    user_id: String,
    expense: StoredExpense,
    created_at: DateTime<Utc>,
}

impl From<ExpenseRow> for ExpenseRecord {
    fn from(row: ExpenseRow) -> Self {
        Self {
            id: id_text(row.id),
            user_id: row.user_id,
            category: row.expense.category,
            amount: row.expense.amount,
            notes: row.expense.notes,
            created_at: row.created_at,
        }
    }
}

// Tables may use bigint or uuid keys.
fn id_text(id: Value) -> String {
    match id {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

impl SupabaseStore {
    pub fn new(base_url: String, key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
        }
    }

    fn table(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=representation")
    }

    fn url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>, AppError> {
        let response = self
            .table(request)
            .send()
            .await
            .map_err(|err| AppError::Storage(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("{status}: {text}")));
        }
        response
            .json()
            .await
            .map_err(|err| AppError::Storage(err.to_string()))
    }

    async fn insert<T: DeserializeOwned>(&self, table: &str, body: Value) -> Result<T, AppError> {
        let request = self.client.post(self.url(table)).json(&body);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Storage(format!("insert into {table} returned no row")))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        owner: &Owner,
    ) -> Result<Vec<T>, AppError> {
        let owner_filter = format!("eq.{owner}");
        let request = self.client.get(self.url(table)).query(&[
            ("select", "*"),
            ("user_id", owner_filter.as_str()),
            ("order", "created_at.desc"),
        ]);
        self.rows(request).await
    }
}

#[async_trait]
impl TravelStore for SupabaseStore {
    fn backend(&self) -> &'static str {
        "supabase"
    }

    async fn save_plan(
        &self,
        owner: &Owner,
        request: TripRequest,
        itinerary: Itinerary,
    ) -> Result<PlanRecord, AppError> {
        let body = json!({
            "user_id": owner.as_str(),
            "plan": StoredPlan { request, itinerary },
        });
        let row: PlanRow = self.insert(PLANS_TABLE, body).await?;
        Ok(row.into())
    }

    async fn list_plans(&self, owner: &Owner) -> Result<Vec<PlanRecord>, AppError> {
        let rows: Vec<PlanRow> = self.select(PLANS_TABLE, owner).await?;
        Ok(rows.into_iter().map(PlanRecord::from).collect())
    }

    async fn delete_plan(&self, owner: &Owner, id: &str) -> Result<bool, AppError> {
        let id_filter = format!("eq.{id}");
        let owner_filter = format!("eq.{owner}");
        let request = self.client.delete(self.url(PLANS_TABLE)).query(&[
            ("id", id_filter.as_str()),
            ("user_id", owner_filter.as_str()),
        ]);
        let removed: Vec<Value> = self.rows(request).await?;
        Ok(!removed.is_empty())
    }

    async fn save_expense(
        &self,
        owner: &Owner,
        input: ExpenseInput,
    ) -> Result<ExpenseRecord, AppError> {
        let body = json!({
            "user_id": owner.as_str(),
            "expense": StoredExpense {
                category: input.category,
                amount: input.amount,
                notes: normalize_optional(input.notes),
            },
        });
        let row: ExpenseRow = self.insert(EXPENSES_TABLE, body).await?;
        Ok(row.into())
    }

    async fn list_expenses(&self, owner: &Owner) -> Result<Vec<ExpenseRecord>, AppError> {
        let rows: Vec<ExpenseRow> = self.select(EXPENSES_TABLE, owner).await?;
        Ok(rows.into_iter().map(ExpenseRecord::from).collect())
    }
}
