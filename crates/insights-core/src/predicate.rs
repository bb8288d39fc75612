//! Predicate tree for selecting records
//!
//! A `Predicate` is a plain value built once from request parameters. It can be
//! compiled into a SQL condition with bound parameters (`to_sql`) or evaluated
//! directly against a `Record` (`matches`). Both paths follow SQL NULL
//! semantics: every comparison against an absent field is false, and only
//! `IsNull` selects absent values.

use chrono::{DateTime, Utc};
use rusqlite::types::ToSqlOutput;

use crate::models::Record;
use crate::timestamp::format_timestamp;

/// A filterable record column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    EndYear,
    StartYear,
    Intensity,
    Relevance,
    Likelihood,
    Sector,
    Topic,
    Region,
    Country,
    Pestle,
    Source,
    Title,
    Added,
    Published,
}

impl Field {
    /// Column name in the `records` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::EndYear => "end_year",
            Self::StartYear => "start_year",
            Self::Intensity => "intensity",
            Self::Relevance => "relevance",
            Self::Likelihood => "likelihood",
            Self::Sector => "sector",
            Self::Topic => "topic",
            Self::Region => "region",
            Self::Country => "country",
            Self::Pestle => "pestle",
            Self::Source => "source",
            Self::Title => "title",
            Self::Added => "added",
            Self::Published => "published",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// A typed scalar to compare a field against
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Int(i) => ToSqlOutput::from(*i),
            Self::Float(f) => ToSqlOutput::from(*f),
            Self::Text(s) => ToSqlOutput::from(s.as_str()),
            Self::Timestamp(ts) => ToSqlOutput::from(format_timestamp(ts)),
        })
    }
}

impl Value {
    /// JSON form; `json_each` yields it back with the matching SQL type
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Text(s) => serde_json::Value::from(s.as_str()),
            Self::Timestamp(ts) => serde_json::Value::from(format_timestamp(ts)),
        }
    }
}

/// Borrowed view of a present record field
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldRef<'a> {
    Int(i64),
    Text(&'a str),
    Timestamp(DateTime<Utc>),
}

impl<'a> FieldRef<'a> {
    fn of(record: &'a Record, field: Field) -> Option<Self> {
        match field {
            Field::EndYear => record.end_year.map(FieldRef::Int),
            Field::StartYear => record.start_year.map(FieldRef::Int),
            Field::Intensity => record.intensity.map(FieldRef::Int),
            Field::Relevance => record.relevance.map(FieldRef::Int),
            Field::Likelihood => record.likelihood.map(FieldRef::Int),
            Field::Sector => record.sector.as_deref().map(FieldRef::Text),
            Field::Topic => record.topic.as_deref().map(FieldRef::Text),
            Field::Region => record.region.as_deref().map(FieldRef::Text),
            Field::Country => record.country.as_deref().map(FieldRef::Text),
            Field::Pestle => record.pestle.as_deref().map(FieldRef::Text),
            Field::Source => record.source.as_deref().map(FieldRef::Text),
            Field::Title => record.title.as_deref().map(FieldRef::Text),
            Field::Added => record.added.map(FieldRef::Timestamp),
            Field::Published => record.published.map(FieldRef::Timestamp),
        }
    }

    /// Ordering against a filter value; `None` when the types are incomparable
    fn compare(&self, value: &Value) -> Option<std::cmp::Ordering> {
        match (self, value) {
            (Self::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Self::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Text(a), Value::Text(b)) => Some((*a).cmp(b.as_str())),
            (Self::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// A boolean condition over record fields
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// No constraint
    All,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Eq(Field, Value),
    /// ASCII case-insensitive substring match
    Contains(Field, String),
    Gte(Field, Value),
    Lte(Field, Value),
    In(Field, Vec<Value>),
    IsNull(Field),
}

impl Default for Predicate {
    fn default() -> Self {
        Self::All
    }
}

/// Compiled SQL condition with its bound parameters
#[derive(Debug)]
pub struct SqlFilter {
    /// Boolean SQL expression (never empty)
    pub condition: String,
    pub params: Vec<Value>,
}

impl Predicate {
    /// Conjunction of `parts`, flattening nested `And` and dropping `All`
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Self::All => {}
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::All,
            1 => flat.pop().unwrap_or(Self::All),
            _ => Self::And(flat),
        }
    }

    /// Whether this predicate imposes no constraint
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Compile into a SQL condition over the `records` table
    pub fn to_sql(&self) -> SqlFilter {
        let mut condition = String::new();
        let mut params = Vec::new();
        self.write_sql(&mut condition, &mut params);
        SqlFilter { condition, params }
    }

    fn write_sql(&self, out: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::All => out.push_str("1 = 1"),
            Self::And(parts) => write_joined(out, params, parts, " AND ", "1 = 1"),
            Self::Or(parts) => write_joined(out, params, parts, " OR ", "1 = 0"),
            Self::Eq(field, value) => {
                out.push_str(&format!("{} = ?", field.column()));
                params.push(value.clone());
            }
            Self::Contains(field, text) => {
                out.push_str(&format!("{} LIKE ? ESCAPE '\\'", field.column()));
                params.push(Value::Text(format!("%{}%", escape_like(text))));
            }
            Self::Gte(field, value) => {
                out.push_str(&format!("{} >= ?", field.column()));
                params.push(value.clone());
            }
            Self::Lte(field, value) => {
                out.push_str(&format!("{} <= ?", field.column()));
                params.push(value.clone());
            }
            Self::In(field, values) => {
                if values.is_empty() {
                    out.push_str("1 = 0");
                    return;
                }
                // One bound JSON array regardless of set size
                out.push_str(&format!(
                    "{} IN (SELECT value FROM json_each(?))",
                    field.column()
                ));
                params.push(Value::Text(json_array(values)));
            }
            Self::IsNull(field) => out.push_str(&format!("{} IS NULL", field.column())),
        }
    }

    /// Evaluate against a single record
    pub fn matches(&self, record: &Record) -> bool {
        use std::cmp::Ordering;

        match self {
            Self::All => true,
            Self::And(parts) => parts.iter().all(|p| p.matches(record)),
            Self::Or(parts) => parts.iter().any(|p| p.matches(record)),
            Self::Eq(field, value) => FieldRef::of(record, *field)
                .and_then(|f| f.compare(value))
                .is_some_and(|o| o == Ordering::Equal),
            Self::Contains(field, text) => match FieldRef::of(record, *field) {
                Some(FieldRef::Text(s)) => s
                    .to_ascii_lowercase()
                    .contains(&text.to_ascii_lowercase()),
                _ => false,
            },
            Self::Gte(field, value) => FieldRef::of(record, *field)
                .and_then(|f| f.compare(value))
                .is_some_and(|o| o != Ordering::Less),
            Self::Lte(field, value) => FieldRef::of(record, *field)
                .and_then(|f| f.compare(value))
                .is_some_and(|o| o != Ordering::Greater),
            Self::In(field, values) => match FieldRef::of(record, *field) {
                Some(f) => values
                    .iter()
                    .any(|v| f.compare(v) == Some(Ordering::Equal)),
                None => false,
            },
            Self::IsNull(field) => FieldRef::of(record, *field).is_none(),
        }
    }
}

fn write_joined(
    out: &mut String,
    params: &mut Vec<Value>,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        out.push_str(empty);
        return;
    }
    out.push('(');
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        part.write_sql(out, params);
    }
    out.push(')');
}

/// Encode a value set as a JSON array for `json_each`
fn json_array(values: &[Value]) -> String {
    let items: Vec<serde_json::Value> = values.iter().map(Value::to_json).collect();
    serde_json::Value::Array(items).to_string()
}

/// Escape LIKE wildcards so user text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl SqlFilter {
    /// WHERE clause including the "WHERE" keyword
    pub fn where_clause(&self) -> String {
        format!("WHERE {}", self.condition)
    }

    /// WHERE clause with an extra condition ANDed on
    pub fn where_clause_and(&self, extra: &str) -> String {
        format!("WHERE ({}) AND {}", self.condition, extra)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params
            .iter()
            .map(|p| p as &dyn rusqlite::ToSql)
            .collect()
    }
}
