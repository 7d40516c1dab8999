use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::models::Country;

/// Action tag recorded in the audit log.
///
/// Serialized as a plain snake_case string. Tags this crate does not produce
/// itself round-trip through [`HistoryAction::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HistoryAction {
    Add,
    Edit,
    Delete,
    ToggleVisited,
    Undo,
    Redo,
    Import,
    Other(String),
}

impl HistoryAction {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::ToggleVisited => "toggle_visited",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Import => "import",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl From<&str> for HistoryAction {
    fn from(tag: &str) -> Self {
        match tag {
            "add" => Self::Add,
            "edit" => Self::Edit,
            "delete" => Self::Delete,
            "toggle_visited" => Self::ToggleVisited,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "import" => Self::Import,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for HistoryAction {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<HistoryAction> for String {
    fn from(action: HistoryAction) -> Self {
        action.type_name().to_string()
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.type_name())
    }
}

/// One line of the audit log. `data` is an opaque snapshot of what changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub action: HistoryAction,
    #[serde(default)]
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(action: impl Into<HistoryAction>, data: serde_json::Value) -> Self {
        Self {
            id: Ulid::new().to_string(),
            action: action.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    /// Short human-readable description for listings.
    pub fn describe(&self) -> String {
        let name = |key: &str| {
            self.data
                .get(key)
                .and_then(|c| c.get("name"))
                .and_then(|n| n.as_str())
                .map(str::to_string)
        };
        match &self.action {
            HistoryAction::Add => format!("Added {}", name("country").unwrap_or_default()),
            HistoryAction::Delete => match name("country") {
                Some(n) => format!("Deleted {n}"),
                None => "Deleted (nothing)".to_string(),
            },
            HistoryAction::Edit => format!("Edited {}", self.data_id()),
            HistoryAction::ToggleVisited => format!("Toggled visited on {}", self.data_id()),
            HistoryAction::Undo => "Undo".to_string(),
            HistoryAction::Redo => "Redo".to_string(),
            HistoryAction::Import => {
                let count = self.data.get("count").and_then(|c| c.as_u64()).unwrap_or(0);
                format!("Imported {count} countries")
            }
            HistoryAction::Other(tag) => tag.replace('_', " "),
        }
    }

    fn data_id(&self) -> &str {
        self.data.get("id").and_then(|v| v.as_str()).unwrap_or("?")
    }
}

/// Decode a stored audit log entry by entry, in document order.
///
/// Entries that fail to decode are skipped with a warning; anything other
/// than a JSON array yields an empty log.
pub fn read_log(value: serde_json::Value) -> Vec<HistoryEntry> {
    let serde_json::Value::Array(items) = value else {
        tracing::warn!("stored history is not an array, ignoring it");
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "skipping unreadable history entry");
                None
            }
        })
        .collect()
}

/// A full copy of the record collection, used as an undo/redo frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub countries: Vec<Country>,
}

impl Snapshot {
    pub fn of(countries: &[Country]) -> Self {
        Self {
            countries: countries.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&HistoryAction::ToggleVisited).unwrap();
        assert_eq!(json, "\"toggle_visited\"");
        assert_eq!(HistoryAction::ToggleVisited.type_name(), "toggle_visited");
    }

    #[test]
    fn test_unknown_tag_roundtrips() {
        let action: HistoryAction = serde_json::from_str("\"export\"").unwrap();
        assert_eq!(action, HistoryAction::Other("export".into()));
        assert_eq!(serde_json::to_string(&action).unwrap(), "\"export\"");

        let known: HistoryAction = serde_json::from_str("\"undo\"").unwrap();
        assert_eq!(known, HistoryAction::Undo);
    }

    #[test]
    fn test_read_log_skips_bad_entries() {
        let raw = serde_json::json!([
            { "id": "3", "action": "export", "data": {}, "timestamp": "2024-03-01T10:00:00.000Z" },
            { "id": "2", "action": "add" },
            { "id": "1", "action": "toggle_visited", "data": { "id": "4" }, "timestamp": "2024-02-01T10:00:00Z" }
        ]);
        let log = read_log(raw);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, HistoryAction::Other("export".into()));
        assert_eq!(log[1].id, "1");

        assert!(read_log(serde_json::json!({ "not": "a list" })).is_empty());
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = HistoryEntry::new(HistoryAction::Undo, serde_json::Value::Null);
        let b = HistoryEntry::new(HistoryAction::Undo, serde_json::Value::Null);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_describe() {
        let entry = HistoryEntry::new(
            HistoryAction::Delete,
            serde_json::json!({ "country": null }),
        );
        assert_eq!(entry.describe(), "Deleted (nothing)");

        let entry = HistoryEntry::new(
            HistoryAction::Add,
            serde_json::json!({ "country": { "name": "Peru" } }),
        );
        assert_eq!(entry.describe(), "Added Peru");
    }
}
