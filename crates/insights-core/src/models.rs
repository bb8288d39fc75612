//! Domain models for the insights dashboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the analytical dataset
///
/// Every field except `id` may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub end_year: Option<i64>,
    pub intensity: Option<i64>,
    pub sector: Option<String>,
    pub topic: Option<String>,
    pub insight: Option<String>,
    pub url: Option<String>,
    pub region: Option<String>,
    pub start_year: Option<i64>,
    pub impact: Option<String>,
    pub added: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub relevance: Option<i64>,
    pub pestle: Option<String>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub likelihood: Option<i64>,
}

/// A record to be imported (before DB insertion)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecord {
    pub end_year: Option<i64>,
    pub intensity: Option<i64>,
    pub sector: Option<String>,
    pub topic: Option<String>,
    pub insight: Option<String>,
    pub url: Option<String>,
    pub region: Option<String>,
    pub start_year: Option<i64>,
    pub impact: Option<String>,
    pub added: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
    pub country: Option<String>,
    pub relevance: Option<i64>,
    pub pestle: Option<String>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub likelihood: Option<i64>,
}

// ========== Statistics ==========

/// Average intensity and record count for one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorStat {
    pub sector: String,
    pub intensity: f64,
    pub count: i64,
}

/// Average intensity and record count for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStat {
    pub region: String,
    pub intensity: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicStat {
    pub topic: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodStat {
    pub likelihood: i64,
    pub count: i64,
}

/// One year bucket of the trend series
///
/// Averages treat absent scores as zero (unlike every other statistic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTrend {
    pub year: i64,
    pub intensity: f64,
    pub relevance: f64,
    pub likelihood: f64,
    pub count: i64,
}

/// Summary statistics over a filtered view of the record store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordStats {
    pub avg_intensity: Option<f64>,
    pub avg_likelihood: Option<f64>,
    pub avg_relevance: Option<f64>,
    pub total_records: i64,
    pub sectors: Vec<SectorStat>,
    pub topics: Vec<TopicStat>,
    pub regions: Vec<RegionStat>,
    pub yearly_trends: Vec<YearlyTrend>,
    pub likelihoods: Vec<LikelihoodStat>,
}

// ========== Facets ==========

/// Distinct values across the whole store, used to populate filter menus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub end_years: Vec<i64>,
    pub topics: Vec<String>,
    pub sectors: Vec<String>,
    pub regions: Vec<String>,
    pub pestles: Vec<String>,
    pub sources: Vec<String>,
    pub countries: Vec<String>,
}

/// A distinct value together with how many records carry it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetItem<T> {
    pub label: T,
    pub value: T,
    pub count: i64,
}

impl<T: Clone> FacetItem<T> {
    pub fn new(value: T, count: i64) -> Self {
        Self {
            label: value.clone(),
            value,
            count,
        }
    }
}

/// Per-field value counts over a (possibly filtered) view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facets {
    pub end_year: Vec<FacetItem<i64>>,
    pub topic: Vec<FacetItem<String>>,
    pub sector: Vec<FacetItem<String>>,
    pub region: Vec<FacetItem<String>>,
    pub pestle: Vec<FacetItem<String>>,
    pub source: Vec<FacetItem<String>>,
    pub country: Vec<FacetItem<String>>,
}
