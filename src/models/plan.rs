use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{itinerary::Itinerary, trip::TripRequest};

/// A trip request paired with the itinerary generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: String,
    pub user_id: String,
    pub request: TripRequest,
    pub itinerary: Itinerary,
    pub created_at: DateTime<Utc>,
}

impl PlanRecord {
    pub fn new(user_id: impl Into<String>, request: TripRequest, itinerary: Itinerary) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            request,
            itinerary,
            created_at: Utc::now(),
        }
    }
}

/// The payload stored next to the owner column in hosted tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPlan {
    pub request: TripRequest,
    pub itinerary: Itinerary,
}
