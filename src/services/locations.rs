//! Turning itinerary text into place names a geocoder can resolve.
//!
//! [`normalize_location`] applies these rules in order:
//!
//! 1. parenthetical asides are removed, ASCII `(...)` and full-width `（...）` alike;
//! 2. everything from the first separator (`-`, `:`, `：`) on is dropped;
//! 3. everything from the "nearby" marker `附近` on is dropped;
//! 4. surrounding whitespace is trimmed;
//! 5. anything shorter than two characters is rejected.

use std::{collections::HashSet, sync::OnceLock};

use regex::Regex;

use crate::models::itinerary::Itinerary;

const SEPARATORS: [char; 3] = ['-', ':', '：'];
const NEARBY_MARKER: &str = "附近";
const MIN_CHARS: usize = 2;

fn parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)|（[^）]*）").expect("static regex"))
}

fn bold_lead() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+.*?\*\*([^*]+)\*\*").expect("static regex")
    })
}

pub fn normalize_location(raw: &str) -> Option<String> {
    let without_asides = parenthetical().replace_all(raw, "");
    let head = match without_asides.find(|c: char| SEPARATORS.contains(&c)) {
        Some(idx) => &without_asides[..idx],
        None => &without_asides[..],
    };
    let head = match head.find(NEARBY_MARKER) {
        Some(idx) => &head[..idx],
        None => head,
    };
    let name = head.trim();
    (name.chars().count() >= MIN_CHARS).then(|| name.to_string())
}

/// Normalized, de-duplicated place names in itinerary order.
pub fn extract_locations(itinerary: &Itinerary) -> Vec<String> {
    let raw: Vec<String> = match itinerary {
        Itinerary::Structured(plan) => plan
            .days
            .iter()
            .flat_map(|day| day.activities.iter())
            .map(|activity| activity.location.clone())
            .collect(),
        Itinerary::Markdown(text) => text
            .lines()
            .filter_map(|line| bold_lead().captures(line))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect(),
    };

    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(|name| normalize_location(name))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::{Activity, ItineraryDay, StructuredItinerary};

    #[test]
    fn strips_ascii_parentheses() {
        assert_eq!(
            normalize_location("Kiyomizu-dera (UNESCO site)").as_deref(),
            Some("Kiyomizu")
        );
        assert_eq!(
            normalize_location("Nishiki Market (lunch) Stall 3").as_deref(),
            Some("Nishiki Market  Stall 3")
        );
    }

    #[test]
    fn strips_full_width_parentheses() {
        assert_eq!(normalize_location("故宫博物院（午门入口）").as_deref(), Some("故宫博物院"));
    }

    #[test]
    fn cuts_at_first_separator() {
        assert_eq!(normalize_location("天安门广场-升旗仪式").as_deref(), Some("天安门广场"));
        assert_eq!(normalize_location("Gion: evening walk").as_deref(), Some("Gion"));
        assert_eq!(normalize_location("颐和园：划船").as_deref(), Some("颐和园"));
    }

    #[test]
    fn cuts_at_nearby_marker() {
        assert_eq!(normalize_location("王府井附近的小吃街").as_deref(), Some("王府井"));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize_location("   Arashiyama  ").as_deref(), Some("Arashiyama"));
    }

    #[test]
    fn rejects_too_short_names() {
        assert_eq!(normalize_location("A"), None);
        assert_eq!(normalize_location("(hotel)"), None);
        assert_eq!(normalize_location("  - lunch"), None);
        assert_eq!(normalize_location("湖").as_deref(), None);
        assert_eq!(normalize_location("西湖").as_deref(), Some("西湖"));
    }

    fn activity(location: &str) -> Activity {
        Activity {
            time: None,
            location: location.into(),
            description: String::new(),
            cost_estimate: None,
            kind: None,
        }
    }

    #[test]
    fn structured_locations_are_normalized_and_deduplicated() {
        let itinerary = Itinerary::Structured(StructuredItinerary {
            title: "Beijing".into(),
            destination_city: Some("Beijing".into()),
            summary: String::new(),
            total_budget_estimate: None,
            days: vec![
                ItineraryDay {
                    day: 1,
                    date: None,
                    activities: vec![activity("故宫博物院（午门）"), activity("景山公园")],
                },
                ItineraryDay {
                    day: 2,
                    date: None,
                    activities: vec![activity("故宫博物院"), activity("X")],
                },
            ],
            budget_breakdown: Default::default(),
        });
        assert_eq!(extract_locations(&itinerary), vec!["故宫博物院", "景山公园"]);
    }

    #[test]
    fn markdown_locations_come_from_bold_list_leads() {
        let itinerary = Itinerary::Markdown(
            "# Overview\n**Not a list item**\n## Day 1\n- 09:00 **Fushimi Inari Taisha**: hike\n\
             * **Nishiki Market** (lunch)\n1. **Gion - evening**\n- plain stop"
                .into(),
        );
        assert_eq!(
            extract_locations(&itinerary),
            vec!["Fushimi Inari Taisha", "Nishiki Market", "Gion"]
        );
    }
}
