use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use crate::{
    error::AppError, identity::Owner, services::planner::BudgetRequest, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/budget", post(analyze_budget))
}

#[derive(Serialize)]
struct BudgetSummary {
    summary: String,
}

async fn analyze_budget(
    State(state): State<AppState>,
    owner: Owner,
    WithRejection(Json(request), _): WithRejection<Json<BudgetRequest>, AppError>,
) -> Result<Json<BudgetSummary>, AppError> {
    let stored = match request.expenses {
        Some(_) => Vec::new(),
        None => {
            let owner = owner.or_body(request.user_id.as_deref());
            state.store.list_expenses(&owner).await?
        }
    };
    let summary = state.planner.analyze_budget(&request, &stored).await?;
    Ok(Json(BudgetSummary { summary }))
}
