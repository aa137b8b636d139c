use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::info;

use crate::{
    error::AppError,
    identity::Owner,
    models::{itinerary::Itinerary, plan::PlanRecord, trip::TripRequest},
    services::locations::extract_locations,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plan", get(list_plans).post(create_plan))
        .route("/plan/:id", axum::routing::delete(delete_plan))
        .route("/plan/:id/locations", get(plan_locations))
}

#[derive(Serialize)]
struct PlanCreated {
    itinerary: Itinerary,
    saved: PlanRecord,
}

async fn create_plan(
    State(state): State<AppState>,
    owner: Owner,
    WithRejection(Json(request), _): WithRejection<Json<TripRequest>, AppError>,
) -> Result<Json<PlanCreated>, AppError> {
    let owner = owner.or_body(request.user_id.as_deref());
    request.validate()?;

    let itinerary = state.planner.generate_itinerary(&request).await?;
    let saved = state
        .store
        .save_plan(&owner, request, itinerary.clone())
        .await?;
    info!(%owner, plan = %saved.id, "plan saved");

    Ok(Json(PlanCreated { itinerary, saved }))
}

#[derive(Serialize)]
struct PlanList {
    plans: Vec<PlanRecord>,
}

async fn list_plans(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<PlanList>, AppError> {
    let plans = state.store.list_plans(&owner).await?;
    Ok(Json(PlanList { plans }))
}

#[derive(Serialize)]
struct PlanDeleted {
    deleted: bool,
}

async fn delete_plan(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<PlanDeleted>, AppError> {
    if !state.store.delete_plan(&owner, &id).await? {
        return Err(AppError::NotFound);
    }
    info!(%owner, plan = %id, "plan deleted");
    Ok(Json(PlanDeleted { deleted: true }))
}

#[derive(Serialize)]
struct PlanLocations {
    city: Option<String>,
    locations: Vec<String>,
}

async fn plan_locations(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<PlanLocations>, AppError> {
    let plan = state
        .store
        .find_plan(&owner, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(PlanLocations {
        city: plan_city(&plan),
        locations: extract_locations(&plan.itinerary),
    }))
}

/// City used to scope geocoding: the model's answer first, then the request.
pub(crate) fn plan_city(plan: &PlanRecord) -> Option<String> {
    plan.itinerary
        .destination_city()
        .map(str::to_string)
        .or_else(|| plan.request.destination.clone())
        .map(|city| city.trim().to_string())
        .filter(|city| !city.is_empty())
}
