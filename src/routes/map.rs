use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::{
    error::AppError,
    identity::Owner,
    routes::plans::plan_city,
    services::{
        geocode::{place_markers, GeocodeError, MarkerPlacement},
        locations::extract_locations,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/map/markers", post(markers))
}

/// Either explicit place names or a stored plan to pull them from.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkerRequest {
    #[serde(default)]
    places: Option<Vec<String>>,
    #[serde(default)]
    plan_id: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

async fn markers(
    State(state): State<AppState>,
    owner: Owner,
    WithRejection(Json(request), _): WithRejection<Json<MarkerRequest>, AppError>,
) -> Result<Json<MarkerPlacement>, AppError> {
    if state.config.map.amap_key.is_none() {
        return Err(GeocodeError::NotConfigured.into());
    }

    let (places, plan_city) = match (request.places, request.plan_id) {
        (Some(places), _) => (places, None),
        (None, Some(plan_id)) => {
            let owner = owner.or_body(request.user_id.as_deref());
            let plan = state
                .store
                .find_plan(&owner, &plan_id)
                .await?
                .ok_or(AppError::NotFound)?;
            (extract_locations(&plan.itinerary), plan_city(&plan))
        }
        (None, None) => {
            return Err(AppError::BadRequest("places or planId is required".into()));
        }
    };
    let city = request
        .city
        .filter(|city| !city.trim().is_empty())
        .or(plan_city);

    // Dropping the handler (client went away) cancels lookups still in flight.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let placement = place_markers(
        state.geocoder.as_ref(),
        &places,
        city.as_deref(),
        state.config.map.geocode_timeout,
        &cancel,
    )
    .await?;
    Ok(Json(placement))
}
