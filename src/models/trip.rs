use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, NoneAsEmptyString};

use crate::error::AppError;

/// Trip parameters as collected by the client form or dictated as free text.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub destination: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub days: Option<u32>,
    pub budget: Option<f64>,
    pub travelers: Option<u32>,
    pub preferences: Option<String>,
    pub notes: Option<String>,
    pub user_input: Option<String>,
    pub user_id: Option<String>,
}

impl TripRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if is_blank(&self.destination) && is_blank(&self.user_input) {
            return Err(AppError::BadRequest(
                "destination or userInput is required".into(),
            ));
        }
        if self.days == Some(0) {
            return Err(AppError::BadRequest("days must be positive".into()));
        }
        if self.travelers == Some(0) {
            return Err(AppError::BadRequest("travelers must be positive".into()));
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(AppError::BadRequest(
                    "budget must be a non-negative number".into(),
                ));
            }
        }
        Ok(())
    }

    /// The request as the model sees it: everything but the owner id.
    pub fn prompt_payload(&self) -> Result<String, AppError> {
        let payload = Self {
            user_id: None,
            ..self.clone()
        };
        serde_json::to_string(&payload).map_err(|err| AppError::Other(err.into()))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}
