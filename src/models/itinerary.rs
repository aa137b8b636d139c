use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Which itinerary shape the model is asked for and validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItineraryFormat {
    #[default]
    Markdown,
    Structured,
}

impl FromStr for ItineraryFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "structured" | "json" => Ok(Self::Structured),
            other => Err(format!("unknown itinerary format '{other}'")),
        }
    }
}

impl fmt::Display for ItineraryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Itinerary {
    Structured(StructuredItinerary),
    Markdown(String),
}

impl Itinerary {
    /// Validates raw model output against `format`. The error is a human-readable reason.
    pub fn parse(format: ItineraryFormat, raw: &str) -> Result<Self, String> {
        let text = strip_code_fences(raw);
        if text.is_empty() {
            return Err("model returned an empty itinerary".into());
        }
        match format {
            ItineraryFormat::Markdown => {
                if !text.lines().any(|line| line.trim_start().starts_with('#')) {
                    return Err("itinerary has no Markdown headings".into());
                }
                Ok(Self::Markdown(text.to_string()))
            }
            ItineraryFormat::Structured => {
                let parsed: StructuredItinerary = serde_json::from_str(text)
                    .map_err(|err| format!("itinerary is not valid JSON: {err}"))?;
                if parsed.title.trim().is_empty() {
                    return Err("itinerary has no title".into());
                }
                if parsed.days.is_empty() {
                    return Err("itinerary has no days".into());
                }
                Ok(Self::Structured(parsed))
            }
        }
    }

    pub fn format(&self) -> ItineraryFormat {
        match self {
            Self::Structured(_) => ItineraryFormat::Structured,
            Self::Markdown(_) => ItineraryFormat::Markdown,
        }
    }

    pub fn destination_city(&self) -> Option<&str> {
        match self {
            Self::Structured(plan) => plan.destination_city.as_deref(),
            Self::Markdown(_) => None,
        }
    }
}

/// Removes a surrounding ```json / ```markdown fence if the model added one.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => return trimmed,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredItinerary {
    pub title: String,
    #[serde(default, alias = "destination_city")]
    pub destination_city: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, alias = "total_budget_estimate")]
    pub total_budget_estimate: Option<CostText>,
    #[serde(alias = "itinerary")]
    pub days: Vec<ItineraryDay>,
    #[serde(default, alias = "budget_breakdown")]
    pub budget_breakdown: BTreeMap<String, CostText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub time: Option<String>,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "cost_estimate")]
    pub cost_estimate: Option<CostText>,
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
}

/// Free-form cost such as "15000 CNY". Models also send bare numbers, which are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CostText(pub String);

impl<'de> Deserialize<'de> for CostText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => CostText(text),
            Raw::Number(number) => CostText(number.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED: &str = r#"{
        "title": "Kyoto for anime fans",
        "destination_city": "Kyoto",
        "summary": "Temples by day, arcades by night",
        "total_budget_estimate": 9800,
        "itinerary": [
            {
                "day": 1,
                "date": "Day 1",
                "activities": [
                    {"time": "09:00", "location": "Fushimi Inari Taisha", "description": "Gates", "cost_estimate": "0 JPY", "type": "sightseeing"}
                ]
            }
        ],
        "budget_breakdown": {"food": "3000 JPY", "transport": 1200}
    }"#;

    #[test]
    fn markdown_needs_a_heading() {
        let parsed = Itinerary::parse(ItineraryFormat::Markdown, "# Overview\nDay 1: temples")
            .expect("markdown");
        assert_eq!(parsed, Itinerary::Markdown("# Overview\nDay 1: temples".into()));

        let err = Itinerary::parse(ItineraryFormat::Markdown, "just a sentence").unwrap_err();
        assert!(err.contains("headings"));
    }

    #[test]
    fn empty_output_is_rejected_for_both_formats() {
        assert!(Itinerary::parse(ItineraryFormat::Markdown, "  \n ").is_err());
        assert!(Itinerary::parse(ItineraryFormat::Structured, "```json\n```").is_err());
    }

    #[test]
    fn structured_accepts_snake_case_and_numeric_costs() {
        let parsed = Itinerary::parse(ItineraryFormat::Structured, STRUCTURED).expect("structured");
        let Itinerary::Structured(plan) = &parsed else {
            panic!("expected structured itinerary");
        };
        assert_eq!(plan.destination_city.as_deref(), Some("Kyoto"));
        assert_eq!(plan.total_budget_estimate, Some(CostText("9800".into())));
        assert_eq!(plan.days[0].activities[0].kind.as_deref(), Some("sightseeing"));
        assert_eq!(plan.budget_breakdown["transport"], CostText("1200".into()));
        assert_eq!(parsed.destination_city(), Some("Kyoto"));
    }

    #[test]
    fn structured_output_inside_fences_is_accepted() {
        let fenced = format!("```json\n{STRUCTURED}\n```");
        assert!(Itinerary::parse(ItineraryFormat::Structured, &fenced).is_ok());
    }

    #[test]
    fn structured_without_days_is_rejected() {
        let err = Itinerary::parse(
            ItineraryFormat::Structured,
            r#"{"title": "Empty", "days": []}"#,
        )
        .unwrap_err();
        assert!(err.contains("no days"));
    }

    #[test]
    fn structured_round_trips_through_untagged_enum() {
        let parsed = Itinerary::parse(ItineraryFormat::Structured, STRUCTURED).expect("structured");
        let json = serde_json::to_value(&parsed).expect("serialize");
        assert_eq!(json["destinationCity"], "Kyoto");
        let back: Itinerary = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, parsed);

        let markdown = Itinerary::Markdown("# Day 1".into());
        let back: Itinerary =
            serde_json::from_value(serde_json::to_value(&markdown).expect("serialize"))
                .expect("deserialize");
        assert_eq!(back.format(), ItineraryFormat::Markdown);
    }

    #[test]
    fn fence_stripping_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  # Plan  "), "# Plan");
        assert_eq!(strip_code_fences("```markdown\n# Plan\n```"), "# Plan");
    }
}
