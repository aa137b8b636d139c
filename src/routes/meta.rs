use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/client-config", get(client_config))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    storage: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        storage: state.store.backend(),
    })
}

/// Runtime settings the browser client needs before it can talk to anything.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientConfig {
    api_base_url: String,
    map_key: Option<String>,
    map_security_code: Option<String>,
    speech_language: String,
    itinerary_format: String,
}

async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    let config = &state.config;
    Json(ClientConfig {
        api_base_url: config.public_api_base_url.clone(),
        map_key: config.map.amap_key.clone(),
        map_security_code: config.map.amap_security_code.clone(),
        speech_language: config.speech_language.clone(),
        itinerary_format: state.planner.format().to_string(),
    })
}
