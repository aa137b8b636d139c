use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ExpenseCategory {
    Transport,
    Lodging,
    Food,
    Tickets,
    Shopping,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Lodging => "lodging",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Tickets => "tickets",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Other => "other",
        }
    }
}

impl From<String> for ExpenseCategory {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "transport" | "transportation" | "travel" | "交通" => Self::Transport,
            "lodging" | "accommodation" | "hotel" | "住宿" => Self::Lodging,
            "food" | "dining" | "meals" | "餐饮" => Self::Food,
            "tickets" | "ticket" | "admission" | "门票" => Self::Tickets,
            "shopping" | "购物" => Self::Shopping,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub category: ExpenseCategory,
    pub amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExpenseInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(AppError::BadRequest(
                "amount must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    pub user_id: String,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(user_id: impl Into<String>, input: ExpenseInput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            category: input.category,
            amount: input.amount,
            notes: normalize_optional(input.notes),
            created_at: Utc::now(),
        }
    }
}

pub fn normalize_optional(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn category_synonyms_map_onto_known_values() {
        assert_eq!(ExpenseCategory::from("Hotel".to_string()), ExpenseCategory::Lodging);
        assert_eq!(ExpenseCategory::from("餐饮".to_string()), ExpenseCategory::Food);
        assert_eq!(ExpenseCategory::from("souvenirs".to_string()), ExpenseCategory::Other);
    }

    #[test]
    fn input_defaults_category_and_serializes_lowercase() {
        let input: ExpenseInput =
            serde_json::from_value(json!({ "amount": 12.5, "notes": "  " })).expect("input");
        assert_eq!(input.category, ExpenseCategory::Other);

        let record = ExpenseRecord::new("alice", input);
        assert_eq!(record.notes, None);
        let value = serde_json::to_value(&record).expect("json");
        assert_eq!(value["category"], "other");
        assert_eq!(value["userId"], "alice");
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let input: ExpenseInput =
            serde_json::from_value(json!({ "category": "food", "amount": -3 })).expect("input");
        assert!(matches!(input.validate(), Err(AppError::BadRequest(_))));
    }
}
