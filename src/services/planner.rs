use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::AppError,
    llm::{
        models::{ChatOptions, Message},
        ChatProvider, LlmError,
    },
    models::{
        expense::ExpenseRecord,
        itinerary::{Itinerary, ItineraryFormat},
        trip::TripRequest,
    },
};

const ITINERARY_TEMPERATURE: f32 = 0.4;
const BUDGET_TEMPERATURE: f32 = 0.3;

const MARKDOWN_ITINERARY_PROMPT: &str = "You are an expert travel planner. Produce detailed \
itineraries including transport, lodging, dining, and kid friendly tips when relevant. Always \
answer in Markdown with sections for Overview, Daily Schedule, Logistics, Dining, Budget \
Breakdown, and Tips. Use one heading per day inside Daily Schedule and start each stop with the \
place name in bold, for example `- **Fushimi Inari Taisha**: morning walk`.";

const STRUCTURED_ITINERARY_PROMPT: &str = r#"You are an expert travel planner. Create a detailed, personalized itinerary for the trip request you receive as JSON.
Return ONLY valid JSON, without Markdown fences, shaped exactly like this:
{
  "title": "short catchy title",
  "destinationCity": "main city of the trip, used to scope map searches",
  "summary": "trip style and highlights",
  "totalBudgetEstimate": "estimated total, e.g. '15000 CNY'",
  "days": [
    {
      "day": 1,
      "date": "YYYY-MM-DD if a start date was given, else 'Day 1'",
      "activities": [
        {
          "time": "09:00",
          "location": "a specific, searchable place name only, no notes, parentheses or actions",
          "description": "what to do there",
          "costEstimate": "estimated cost",
          "type": "sightseeing|food|transport|accommodation"
        }
      ]
    }
  ],
  "budgetBreakdown": {
    "accommodation": "estimated cost",
    "transport": "estimated cost",
    "food": "estimated cost",
    "activities": "estimated cost",
    "misc": "estimated cost"
  }
}
If the request is vague, make reasonable assumptions and prefer popular, highly rated options."#;

const BUDGET_PROMPT: &str = "You are a financial assistant helping travelers track expenses. \
Return a concise Markdown summary with a table of expenses, remaining budget, and suggestions \
to save money.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub expenses: Option<Vec<serde_json::Value>>,
}

/// Prompt construction around a chat provider. One instance per process.
#[derive(Clone)]
pub struct TripPlanner {
    provider: Arc<dyn ChatProvider>,
    format: ItineraryFormat,
}

impl TripPlanner {
    pub fn new(provider: Arc<dyn ChatProvider>, format: ItineraryFormat) -> Self {
        Self { provider, format }
    }

    pub fn format(&self) -> ItineraryFormat {
        self.format
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate_itinerary(&self, request: &TripRequest) -> Result<Itinerary, AppError> {
        let system = match self.format {
            ItineraryFormat::Markdown => MARKDOWN_ITINERARY_PROMPT,
            ItineraryFormat::Structured => STRUCTURED_ITINERARY_PROMPT,
        };
        let messages = [Message::system(system), Message::user(request.prompt_payload()?)];

        let raw = self.complete(&messages, ITINERARY_TEMPERATURE).await?;
        let itinerary = Itinerary::parse(self.format, &raw).map_err(|reason| {
            warn!(format = %self.format, %reason, "model output failed validation");
            LlmError::MalformedOutput(reason)
        })?;
        info!(format = %self.format, "itinerary generated");
        Ok(itinerary)
    }

    /// `stored` is used when the request carries no expense list of its own.
    pub async fn analyze_budget(
        &self,
        request: &BudgetRequest,
        stored: &[ExpenseRecord],
    ) -> Result<String, AppError> {
        if let Some(budget) = request.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(AppError::BadRequest(
                    "budget must be a non-negative number".into(),
                ));
            }
        }

        let expenses = match &request.expenses {
            Some(expenses) => serde_json::Value::Array(expenses.clone()),
            None => serde_json::to_value(stored).map_err(|err| AppError::Other(err.into()))?,
        };
        let payload = json!({
            "budget": request.budget,
            "currency": request.currency,
            "expenses": expenses,
        });
        let messages = [Message::system(BUDGET_PROMPT), Message::user(payload.to_string())];

        let summary = self.complete(&messages, BUDGET_TEMPERATURE).await?;
        if summary.trim().is_empty() {
            return Err(LlmError::EmptyCompletion.into());
        }
        Ok(summary)
    }

    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, AppError> {
        let options = ChatOptions {
            temperature: Some(temperature),
            ..Default::default()
        };
        let response = self.provider.chat(messages, options).await?;
        Ok(response.content)
    }
}
