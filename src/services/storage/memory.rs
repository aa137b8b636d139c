use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    identity::Owner,
    models::{
        expense::{ExpenseInput, ExpenseRecord},
        itinerary::Itinerary,
        plan::PlanRecord,
        trip::TripRequest,
    },
    services::storage::TravelStore,
};

/// Process-lifetime store: owner id to an append-only sequence, oldest first.
#[derive(Default)]
pub struct MemoryStore {
    plans: RwLock<HashMap<String, Vec<PlanRecord>>>,
    expenses: RwLock<HashMap<String, Vec<ExpenseRecord>>>,
}

fn newest_first<T: Clone>(items: Option<&Vec<T>>) -> Vec<T> {
    items
        .map(|items| items.iter().rev().cloned().collect())
        .unwrap_or_default()
}

#[async_trait]
impl TravelStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn save_plan(
        &self,
        owner: &Owner,
        request: TripRequest,
        itinerary: Itinerary,
    ) -> Result<PlanRecord, AppError> {
        let record = PlanRecord::new(owner.as_str(), request, itinerary);
        self.plans
            .write()
            .await
            .entry(owner.as_str().to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list_plans(&self, owner: &Owner) -> Result<Vec<PlanRecord>, AppError> {
        Ok(newest_first(self.plans.read().await.get(owner.as_str())))
    }

    async fn delete_plan(&self, owner: &Owner, id: &str) -> Result<bool, AppError> {
        let mut plans = self.plans.write().await;
        let Some(items) = plans.get_mut(owner.as_str()) else {
            return Ok(false);
        };
        let before = items.len();
        items.retain(|plan| plan.id != id);
        Ok(items.len() != before)
    }

    async fn save_expense(
        &self,
        owner: &Owner,
        input: ExpenseInput,
    ) -> Result<ExpenseRecord, AppError> {
        let record = ExpenseRecord::new(owner.as_str(), input);
        self.expenses
            .write()
            .await
            .entry(owner.as_str().to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list_expenses(&self, owner: &Owner) -> Result<Vec<ExpenseRecord>, AppError> {
        Ok(newest_first(self.expenses.read().await.get(owner.as_str())))
    }
}
