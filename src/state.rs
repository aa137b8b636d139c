use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::AppError,
    llm::provider_from_config,
    services::{
        geocode::{geocoder_from_config, Geocoder},
        planner::TripPlanner,
        storage::{self, TravelStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub planner: TripPlanner,
    pub store: Arc<dyn TravelStore>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        planner: TripPlanner,
        store: Arc<dyn TravelStore>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            config,
            planner,
            store,
            geocoder,
        }
    }

    /// Resolves every collaborator from configuration, once.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let planner = TripPlanner::new(
            provider_from_config(&config.llm),
            config.llm.itinerary_format,
        );
        let store = storage::connect(&config.storage).await?;
        let geocoder = geocoder_from_config(&config.map);
        Ok(Self::new(config, planner, store, geocoder))
    }
}
