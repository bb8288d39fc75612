//! Bulk JSON import
//!
//! Loads a JSON array of flat record objects into the store. Bad items are
//! collected as failures and skipped; they never abort the import.

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::NewRecord;
use crate::timestamp::parse_timestamp;

/// Records per insert transaction
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Failures listed individually in the report
pub const MAX_REPORTED_FAILURES: usize = 10;

/// An item that could not be imported
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFailure {
    /// The item's title, or "Untitled"
    pub item: String,
    pub error: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    /// Human-readable report, one line per entry
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Successfully imported {} records", self.imported)];

        if !self.failures.is_empty() {
            lines.push(format!("{} records failed:", self.failures.len()));
            for failure in self.failures.iter().take(MAX_REPORTED_FAILURES) {
                lines.push(format!("  - {}: {}", failure.item, failure.error));
            }
            if self.failures.len() > MAX_REPORTED_FAILURES {
                lines.push(format!(
                    "  ... and {} more errors",
                    self.failures.len() - MAX_REPORTED_FAILURES
                ));
            }
        }

        lines
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.report_lines().join("\n"))
    }
}

/// Import records from a JSON file
pub fn import_file(db: &Database, path: &Path, batch_size: usize) -> Result<ImportSummary> {
    let file = File::open(path)?;
    info!(path = %path.display(), "Importing records");
    import_json(db, BufReader::new(file), batch_size)
}

/// Import records from a JSON array
///
/// Valid items are inserted in batches of `batch_size` (at least 1).
pub fn import_json<R: Read>(db: &Database, reader: R, batch_size: usize) -> Result<ImportSummary> {
    let data: Value = serde_json::from_reader(reader)?;
    let items = match data {
        Value::Array(items) => items,
        other => {
            return Err(Error::Import(format!(
                "expected a JSON array of records, found {}",
                json_kind(&other)
            )))
        }
    };

    let batch_size = batch_size.max(1);
    let mut summary = ImportSummary::default();
    let mut batch = Vec::with_capacity(batch_size.min(items.len()));

    for (index, item) in items.iter().enumerate() {
        match normalize_item(item) {
            Ok(record) => {
                batch.push(record);
                if batch.len() >= batch_size {
                    summary.imported += flush_batch(db, &mut batch)?;
                }
            }
            Err(e) => {
                let label = item_label(item);
                warn!(index, item = %label, error = %e, "Skipping invalid record");
                summary.failures.push(ImportFailure {
                    item: label,
                    error: e.to_string(),
                });
            }
        }
    }

    if !batch.is_empty() {
        summary.imported += flush_batch(db, &mut batch)?;
    }

    info!(
        imported = summary.imported,
        failed = summary.failures.len(),
        "Import complete"
    );
    Ok(summary)
}

fn flush_batch(db: &Database, batch: &mut Vec<NewRecord>) -> Result<usize> {
    let count = db.insert_records(batch)?;
    info!(count, "Imported batch");
    batch.clear();
    Ok(count)
}

/// Convert one raw JSON item into a record
///
/// Empty strings become null, unknown keys are ignored and unparseable
/// dates become null. Values of the wrong JSON type are an error.
pub fn normalize_item(item: &Value) -> Result<NewRecord> {
    let obj = item.as_object().ok_or_else(|| {
        Error::InvalidData(format!("expected an object, found {}", json_kind(item)))
    })?;

    Ok(NewRecord {
        end_year: int_field(obj, "end_year")?,
        intensity: int_field(obj, "intensity")?,
        sector: text_field(obj, "sector")?,
        topic: text_field(obj, "topic")?,
        insight: text_field(obj, "insight")?,
        url: text_field(obj, "url")?,
        region: text_field(obj, "region")?,
        start_year: int_field(obj, "start_year")?,
        impact: text_field(obj, "impact")?,
        added: date_field(obj, "added")?,
        published: date_field(obj, "published")?,
        country: text_field(obj, "country")?,
        relevance: int_field(obj, "relevance")?,
        pestle: text_field(obj, "pestle")?,
        source: text_field(obj, "source")?,
        title: text_field(obj, "title")?,
        likelihood: int_field(obj, "likelihood")?,
    })
}

/// Label used in failure reports
fn item_label(item: &Value) -> String {
    item.get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled")
        .to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn wrong_type(key: &str, expected: &str, value: &Value) -> Error {
    Error::InvalidData(format!(
        "{}: expected {}, found {}",
        key,
        expected,
        json_kind(value)
    ))
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(wrong_type(key, "text", other)),
    }
}

fn int_field(obj: &Map<String, Value>, key: &str) -> Result<Option<i64>> {
    let value = match obj.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };

    parsed
        .map(Some)
        .ok_or_else(|| wrong_type(key, "an integer", value))
}

/// Whole, in-range floats only
fn integral(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() <= 9.0e18).then(|| n as i64)
}

fn date_field(
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            // Source data writes dates like "January, 20 2017 03:51:25"
            let cleaned = s.replace(',', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Ok(None);
            }
            let parsed = parse_timestamp(cleaned);
            if parsed.is_none() {
                debug!(field = key, value = %s, "Unparseable date, storing null");
            }
            Ok(parsed)
        }
        Some(other) => Err(wrong_type(key, "a date string", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_normalize_source_item() {
        let item = json!({
            "end_year": "",
            "intensity": 6,
            "sector": "Energy",
            "topic": "gas",
            "insight": "Annual Energy Outlook",
            "url": "http://www.eia.gov/outlooks/aeo/pdf/0383(2017).pdf",
            "region": "Northern America",
            "start_year": "",
            "impact": "",
            "added": "January, 20 2017 03:51:25",
            "published": "January, 09 2017 00:00:00",
            "country": "United States of America",
            "relevance": 2,
            "pestle": "Industries",
            "source": "EIA",
            "title": "U.S. natural gas consumption is expected to increase.",
            "likelihood": 3
        });

        let record = normalize_item(&item).unwrap();
        assert_eq!(record.end_year, None);
        assert_eq!(record.start_year, None);
        assert_eq!(record.impact, None);
        assert_eq!(record.intensity, Some(6));
        assert_eq!(record.sector.as_deref(), Some("Energy"));
        assert_eq!(
            record.added,
            Some(Utc.with_ymd_and_hms(2017, 1, 20, 3, 51, 25).unwrap())
        );
        assert_eq!(
            record.published,
            Some(Utc.with_ymd_and_hms(2017, 1, 9, 0, 0, 0).unwrap())
        );
        assert_eq!(record.likelihood, Some(3));
    }

    #[test]
    fn test_missing_and_unknown_keys() {
        let record = normalize_item(&json!({"title": "Only a title", "extra": [1, 2]})).unwrap();
        assert_eq!(record.title.as_deref(), Some("Only a title"));
        assert_eq!(record.intensity, None);
        assert_eq!(record.added, None);
    }

    #[test]
    fn test_integer_forms() {
        let record = normalize_item(&json!({
            "end_year": "2018",
            "start_year": 2016.0,
            "intensity": " 12 ",
            "relevance": "3.0"
        }))
        .unwrap();
        assert_eq!(record.end_year, Some(2018));
        assert_eq!(record.start_year, Some(2016));
        assert_eq!(record.intensity, Some(12));
        assert_eq!(record.relevance, Some(3));
    }

    #[test]
    fn test_wrongly_typed_values_fail() {
        assert!(normalize_item(&json!({"intensity": "high"})).is_err());
        assert!(normalize_item(&json!({"intensity": 2.5})).is_err());
        assert!(normalize_item(&json!({"sector": {"name": "Energy"}})).is_err());
        assert!(normalize_item(&json!({"topic": true})).is_err());
        assert!(normalize_item(&json!({"added": 20170120})).is_err());
        assert!(normalize_item(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_unparseable_date_is_null() {
        let record = normalize_item(&json!({"added": "sometime soon", "title": "x"})).unwrap();
        assert_eq!(record.added, None);
    }

    #[test]
    fn test_numeric_text_is_kept_as_text() {
        let record = normalize_item(&json!({"source": 42})).unwrap();
        assert_eq!(record.source.as_deref(), Some("42"));
    }

    #[test]
    fn test_item_label() {
        assert_eq!(item_label(&json!({"title": "Oil"})), "Oil");
        assert_eq!(item_label(&json!({"title": "  "})), "Untitled");
        assert_eq!(item_label(&json!({"title": 5})), "Untitled");
        assert_eq!(item_label(&json!(7)), "Untitled");
    }

    #[test]
    fn test_import_json_batches_and_failures() {
        let db = Database::in_memory().unwrap();
        let data = json!([
            {"title": "a", "intensity": 1},
            {"title": "b", "intensity": "high"},
            {"title": "c", "intensity": 3},
            "garbage",
            {"title": "d"},
            {"title": "e", "sector": ""}
        ])
        .to_string();

        let summary = import_json(&db, data.as_bytes(), 2).unwrap();
        assert_eq!(summary.imported, 4);
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.failures[0].item, "b");
        assert!(summary.failures[0].error.contains("intensity"));
        assert_eq!(summary.failures[1].item, "Untitled");

        assert_eq!(db.count_records(&crate::Predicate::All).unwrap(), 4);
    }

    #[test]
    fn test_import_json_zero_batch_size() {
        let db = Database::in_memory().unwrap();
        let summary = import_json(&db, &b"[{\"title\": \"a\"}]"[..], 0).unwrap();
        assert_eq!(summary.imported, 1);
    }

    #[test]
    fn test_import_json_rejects_non_array() {
        let db = Database::in_memory().unwrap();
        let err = import_json(&db, &b"{\"title\": \"a\"}"[..], 10).unwrap_err();
        assert!(matches!(err, Error::Import(_)));

        let err = import_json(&db, &b"[{"[..], 10).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_import_file() {
        use std::io::Write;

        let db = Database::in_memory().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "From disk", "end_year": 2030, "added": "March, 05 2017 12:00:00"}}]"#
        )
        .unwrap();

        let summary = import_file(&db, file.path(), DEFAULT_BATCH_SIZE).unwrap();
        assert_eq!(summary.imported, 1);
        assert!(summary.failures.is_empty());

        let record = db.get_record(1).unwrap().unwrap();
        assert_eq!(record.end_year, Some(2030));
        assert_eq!(
            record.added,
            Some(Utc.with_ymd_and_hms(2017, 3, 5, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_import_file_missing() {
        let db = Database::in_memory().unwrap();
        let err = import_file(&db, Path::new("/nonexistent/data.json"), 10).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_report_truncates_failures() {
        let summary = ImportSummary {
            imported: 5,
            failures: (0..13)
                .map(|i| ImportFailure {
                    item: format!("item {}", i),
                    error: "bad".to_string(),
                })
                .collect(),
        };

        let lines = summary.report_lines();
        assert_eq!(lines[0], "Successfully imported 5 records");
        assert_eq!(lines[1], "13 records failed:");
        assert_eq!(lines.len(), 2 + MAX_REPORTED_FAILURES + 1);
        assert_eq!(lines.last().unwrap(), "  ... and 3 more errors");
    }

    #[test]
    fn test_report_without_failures() {
        let summary = ImportSummary {
            imported: 2,
            failures: vec![],
        };
        assert_eq!(summary.to_string(), "Successfully imported 2 records");
    }
}
