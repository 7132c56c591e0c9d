//! Typed, lenient view of the scraper's event records.
//!
//! The HTTP endpoint relays the payload untouched; this view is only used by
//! the local `fetch_events` tool to summarise what the feed currently holds.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;

const DESCRIPTION_LIMIT: usize = 100;

/// One calendar entry as written by the SRRC scraper. Every field may be missing.
///
/// Missing, `null` and non-string values read as empty strings; numbers keep
/// their textual form. Absent and empty are therefore indistinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Day of month as shown on the calendar, e.g. "14".
    #[serde(deserialize_with = "lenient_string")]
    pub date_display: String,
    #[serde(deserialize_with = "lenient_string")]
    pub month: String,
    #[serde(deserialize_with = "lenient_string")]
    pub weekday: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub event_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub organizer: String,
}

/// Text of a loosely typed JSON value: strings as-is, numbers formatted,
/// anything else empty.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| value_text(&value))
}

/// Reads events out of a relayed payload.
///
/// Anything that is not an array yields nothing and entries that are not
/// objects are skipped. Odd field values never drop an entry.
pub fn events_from_payload(payload: &Value) -> Vec<Event> {
    let Some(items) = payload.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| Event::deserialize(item).ok())
        .collect()
}

/// Drops repeated events, keeping the first of each.
///
/// Identity is `event_id`; events without one are keyed on title and start date.
pub fn dedupe(events: Vec<Event>) -> Vec<Event> {
    #[derive(PartialEq, Eq, Hash)]
    enum Key {
        Id(String),
        TitleDate(String, String),
    }

    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| {
            let key = if event.event_id.is_empty() {
                Key::TitleDate(event.title.clone(), event.start_date.clone())
            } else {
                Key::Id(event.event_id.clone())
            };
            seen.insert(key)
        })
        .collect()
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit - 3).collect();
    format!("{head}...")
}

impl Event {
    /// Multi-line digest for terminal output.
    ///
    /// Empty fields are treated as missing: an empty title prints "Untitled"
    /// and an empty end date repeats the start date.
    pub fn display(&self) -> String {
        let mut lines = vec![
            format!("{} {} ({})", self.date_display, self.month, self.weekday),
            format!(
                "   {}",
                if self.title.is_empty() { "Untitled" } else { self.title.as_str() }
            ),
        ];

        if !self.location.is_empty() {
            lines.push(format!("   at {}", self.location));
        }
        if !self.organizer.is_empty() {
            lines.push(format!("   by {}", self.organizer));
        }
        if !self.start_date.is_empty() {
            let end = if self.end_date.is_empty() { &self.start_date } else { &self.end_date };
            lines.push(format!("   {} -> {}", self.start_date, end));
        }
        if !self.url.is_empty() {
            lines.push(format!("   {}", self.url));
        }
        if !self.description.is_empty() {
            lines.push(format!("   {}", truncate(&self.description, DESCRIPTION_LIMIT)));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, title: &str, start: &str) -> Event {
        Event {
            event_id: id.to_string(),
            title: title.to_string(),
            start_date: start.to_string(),
            ..Event::default()
        }
    }

    #[test]
    fn test_non_array_payload_yields_no_events() {
        assert!(events_from_payload(&json!({"events": []})).is_empty());
        assert!(events_from_payload(&json!(null)).is_empty());
    }

    #[test]
    fn test_partial_and_malformed_entries() {
        let payload = json!([
            {"title": "Boogie Night", "event_id": "12", "extra": true},
            "not an event",
            {"title": 42, "location": ["Bern"]},
            {}
        ]);
        let events = events_from_payload(&payload);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].title, "Boogie Night");
        assert_eq!(events[0].event_id, "12");
        assert_eq!(events[1].title, "42");
        assert_eq!(events[1].location, "");
        assert_eq!(events[2], Event::default());
    }

    #[test]
    fn test_null_fields_do_not_drop_the_entry() {
        let payload = json!([
            {"title": "Swiss Open", "event_id": "5", "description": null},
            {"title": "Cup", "event_id": "6", "end_date": ""}
        ]);
        let events = events_from_payload(&payload);
        assert_eq!(events.len(), 2, "both entries must survive: {events:?}");
        assert_eq!(events[0].title, "Swiss Open");
        assert_eq!(events[0].description, "");
        assert_eq!(events[1].title, "Cup");
    }

    #[test]
    fn test_serialized_field_order_matches_scraper_output() {
        let text = serde_json::to_string(&event("7", "Cup", "2026-11-01")).unwrap();
        assert!(text.starts_with(r#"{"date_display":"","month":"","weekday":"","title":"Cup","url":"","event_id":"7""#), "{text}");
        assert!(text.ends_with(r#""organizer":""}"#), "{text}");
    }

    #[test]
    fn test_dedupe_by_id_then_title_and_date() {
        let events = vec![
            event("1", "Cup", "2026-11-01"),
            event("1", "Cup (copy)", "2026-11-02"),
            event("", "Workshop", "2026-11-05"),
            event("", "Workshop", "2026-11-05"),
            event("", "Workshop", "2026-11-06"),
        ];
        let unique = dedupe(events);
        let titles: Vec<&str> = unique.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Cup", "Workshop", "Workshop"]);
        assert_eq!(unique[2].start_date, "2026-11-06");
    }

    #[test]
    fn test_display_truncates_long_descriptions() {
        let ev = Event {
            title: "Swiss Open".to_string(),
            date_display: "14".to_string(),
            month: "Nov".to_string(),
            weekday: "Sat".to_string(),
            start_date: "2026-11-14".to_string(),
            description: "x".repeat(150),
            ..Event::default()
        };
        let text = ev.display();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "14 Nov (Sat)");
        assert_eq!(lines[1], "   Swiss Open");
        assert_eq!(lines[2], "   2026-11-14 -> 2026-11-14");
        assert_eq!(lines[3], format!("   {}...", "x".repeat(97)));
    }

    #[test]
    fn test_display_empty_end_date_repeats_start() {
        let ev = Event {
            end_date: String::new(),
            ..event("9", "", "2026-12-05")
        };
        let text = ev.display();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "   Untitled");
        assert_eq!(lines[2], "   2026-12-05 -> 2026-12-05");
    }

    #[test]
    fn test_display_untitled_minimal() {
        assert_eq!(Event::default().display(), "  ()\n   Untitled");
    }
}
