use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use crate::{
    error::AppError,
    identity::Owner,
    models::expense::{ExpenseInput, ExpenseRecord},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/expenses", get(list_expenses).post(create_expense))
}

#[derive(Serialize)]
struct ExpenseSaved {
    saved: ExpenseRecord,
}

async fn create_expense(
    State(state): State<AppState>,
    owner: Owner,
    WithRejection(Json(input), _): WithRejection<Json<ExpenseInput>, AppError>,
) -> Result<Json<ExpenseSaved>, AppError> {
    let owner = owner.or_body(input.user_id.as_deref());
    input.validate()?;
    let saved = state.store.save_expense(&owner, input).await?;
    Ok(Json(ExpenseSaved { saved }))
}

#[derive(Serialize)]
struct ExpenseList {
    expenses: Vec<ExpenseRecord>,
}

async fn list_expenses(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<ExpenseList>, AppError> {
    let expenses = state.store.list_expenses(&owner).await?;
    Ok(Json(ExpenseList { expenses }))
}
