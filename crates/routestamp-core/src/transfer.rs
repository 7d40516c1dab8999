//! Manual export/import of the user's data as one JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteStampError};
use crate::models::{Country, Currency, HistoryEntry, read_log, validate_rating};

/// Format version written into every export.
pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub countries: Vec<Country>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportDocument {
    pub fn capture(countries: Vec<Country>, currency: Currency, history: Vec<HistoryEntry>) -> Self {
        Self {
            countries,
            currency,
            history,
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What an import would change, for confirmation before applying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub countries: usize,
    pub history_entries: usize,
    pub currency: String,
    pub version: String,
}

impl ImportSummary {
    pub fn of(document: &ExportDocument) -> Self {
        Self {
            countries: document.countries.len(),
            history_entries: document.history.len(),
            currency: document.currency.code.clone(),
            version: document.version.clone(),
        }
    }
}

/// Parse and validate an export file without touching any state.
///
/// `countries` must be present and an array. Missing `currency` or `history`
/// fall back to defaults; a missing `exportDate` or `version` is tolerated.
pub fn validate_import(raw: &str) -> Result<ExportDocument> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let Some(object) = value.as_object() else {
        return Err(RouteStampError::InvalidImport(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    match object.get("countries") {
        Some(serde_json::Value::Array(_)) => {}
        Some(_) => {
            return Err(RouteStampError::InvalidImport(
                "`countries` must be an array".to_string(),
            ));
        }
        None => {
            return Err(RouteStampError::InvalidImport(
                "missing `countries`".to_string(),
            ));
        }
    }

    let countries: Vec<Country> = serde_json::from_value(object["countries"].clone())
        .map_err(|e| RouteStampError::InvalidImport(format!("bad country record: {e}")))?;

    let mut ids: Vec<&str> = countries.iter().map(|c| c.id.as_str()).collect();
    ids.sort_unstable();
    if let Some(dup) = ids.windows(2).find(|w| w[0] == w[1]) {
        return Err(RouteStampError::InvalidImport(format!(
            "duplicate country id `{}`",
            dup[0]
        )));
    }

    for country in &countries {
        if let Some(rating) = country.rating {
            validate_rating(rating).map_err(|_| {
                RouteStampError::InvalidImport(format!(
                    "country `{}` has rating {rating}, expected 1-5",
                    country.id
                ))
            })?;
        }
    }

    let currency = match object.get("currency") {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map_err(|e| RouteStampError::InvalidImport(format!("bad currency: {e}")))?,
        _ => Currency::default(),
    };

    // History is informational; unreadable entries are dropped rather than rejected.
    let history: Vec<HistoryEntry> = object
        .get("history")
        .cloned()
        .map(read_log)
        .unwrap_or_default();

    let export_date = object
        .get("exportDate")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let version = object
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or(EXPORT_VERSION)
        .to_string();

    Ok(ExportDocument {
        countries,
        currency,
        history,
        export_date,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_countries;

    #[test]
    fn test_export_then_validate() {
        let doc = ExportDocument::capture(sample_countries(), Currency::usd(), Vec::new());
        let json = doc.to_json_pretty().unwrap();
        assert!(json.contains("\"exportDate\""));
        assert!(json.contains("\"version\": \"1.0.0\""));

        let parsed = validate_import(&json).unwrap();
        assert_eq!(parsed.countries.len(), 8);
        assert_eq!(ImportSummary::of(&parsed).currency, "USD");
    }

    #[test]
    fn test_rejects_missing_countries() {
        let err = validate_import(r#"{"currency": null}"#).unwrap_err();
        assert!(matches!(err, RouteStampError::InvalidImport(_)));
    }

    #[test]
    fn test_rejects_non_array_countries() {
        let err = validate_import(r#"{"countries": {"a": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("must be an array"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = validate_import("{not json").unwrap_err();
        assert!(matches!(err, RouteStampError::Json(_)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let raw = r#"{"countries": [
            {"id": "1", "name": "A", "code": "AA", "region": "Asia", "visited": false},
            {"id": "1", "name": "B", "code": "BB", "region": "Asia", "visited": true}
        ]}"#;
        let err = validate_import(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_minimal_document_uses_defaults() {
        let doc = validate_import(r#"{"countries": []}"#).unwrap();
        assert!(doc.countries.is_empty());
        assert_eq!(doc.currency, Currency::usd());
        assert_eq!(doc.version, EXPORT_VERSION);
    }

    #[test]
    fn test_rejects_out_of_range_rating() {
        let raw = r#"{"countries": [
            {"id": "1", "name": "A", "code": "AA", "region": "Asia", "visited": true, "rating": 9}
        ]}"#;
        let err = validate_import(raw).unwrap_err();
        assert!(matches!(err, RouteStampError::InvalidImport(_)));
        assert!(err.to_string().contains("rating 9"));
    }

    #[test]
    fn test_history_with_foreign_tags_is_kept() {
        let raw = r#"{"countries": [], "history": [
            {"id": "2", "action": "export", "data": {}, "timestamp": "2024-05-02T09:00:00.000Z"},
            {"id": "1", "action": "add", "data": {}, "timestamp": "not a date"}
        ]}"#;
        let doc = validate_import(raw).unwrap();
        assert_eq!(doc.history.len(), 1);
        assert_eq!(doc.history[0].id, "2");
    }
}
