pub mod memory;
pub mod sqlite;
pub mod supabase;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    config::StorageConfig,
    db::init_pool,
    error::AppError,
    identity::Owner,
    models::{
        expense::{ExpenseInput, ExpenseRecord},
        itinerary::Itinerary,
        plan::PlanRecord,
        trip::TripRequest,
    },
};

use memory::MemoryStore;
use sqlite::SqliteStore;
use supabase::SupabaseStore;

/// Per-owner persistence for plans and expenses. Lists are newest first.
#[async_trait]
pub trait TravelStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn save_plan(
        &self,
        owner: &Owner,
        request: TripRequest,
        itinerary: Itinerary,
    ) -> Result<PlanRecord, AppError>;

    async fn list_plans(&self, owner: &Owner) -> Result<Vec<PlanRecord>, AppError>;

    async fn find_plan(&self, owner: &Owner, id: &str) -> Result<Option<PlanRecord>, AppError> {
        Ok(self
            .list_plans(owner)
            .await?
            .into_iter()
            .find(|plan| plan.id == id))
    }

    /// Returns whether a plan with this id existed for this owner.
    async fn delete_plan(&self, owner: &Owner, id: &str) -> Result<bool, AppError>;

    async fn save_expense(
        &self,
        owner: &Owner,
        input: ExpenseInput,
    ) -> Result<ExpenseRecord, AppError>;

    async fn list_expenses(&self, owner: &Owner) -> Result<Vec<ExpenseRecord>, AppError>;
}

/// Picks the backend once at startup: hosted tables, then SQLite, then memory.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn TravelStore>, AppError> {
    let store: Arc<dyn TravelStore> = match (&config.supabase_url, &config.supabase_key) {
        (Some(url), Some(key)) => Arc::new(SupabaseStore::new(url.clone(), key.clone())),
        (url, key) => {
            if url.is_some() != key.is_some() {
                warn!("SUPABASE_URL and SUPABASE_ANON_KEY must both be set, ignoring hosted storage");
            }
            match &config.database_url {
                Some(database_url) => Arc::new(SqliteStore::new(init_pool(database_url).await?)),
                None => Arc::new(MemoryStore::default()),
            }
        }
    };
    info!(backend = store.backend(), "storage ready");
    Ok(store)
}
