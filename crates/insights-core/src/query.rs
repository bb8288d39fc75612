//! Query parameter parsing
//!
//! Converts loosely-typed request parameters (all strings, possibly
//! comma-joined) into a single `Predicate`. Every supplied parameter narrows
//! the result (logical AND); unknown names are ignored.
//!
//! Parsing is permissive: a value that cannot be parsed imposes no constraint
//! for that parameter and never fails the request.
//!
//! Numeric equality and bounds compare fractional input as given, so
//! `end_year=2017.5` matches nothing and `intensity_min=50.5` excludes 50.

use std::collections::HashSet;

use tracing::debug;

use crate::predicate::{Field, Predicate, Value};
use crate::timestamp::parse_timestamp;

/// Literal accepted in `end_years` / `start_years` to select absent values
pub const NULL_TOKEN: &str = "null";

/// How a query parameter constrains its field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamFamily {
    /// Numeric equality (`end_year`, `start_year`)
    Exact(Field),
    /// Case-insensitive substring (`sector`, `title`, ...)
    Substring(Field),
    /// Lower numeric bound (`intensity_min`, ...)
    Min(Field),
    /// Upper numeric bound (`intensity_max`, ...)
    Max(Field),
    /// Inclusive lower datetime bound (`added_after`, ...)
    After(Field),
    /// Inclusive upper datetime bound (`added_before`, ...)
    Before(Field),
    /// Membership in a comma-separated set (`topics`, `sectors`, ...)
    AnyOf(Field),
    /// Comma-separated years, optionally including `null` (`end_years`, ...)
    YearsOrNull(Field),
}

impl ParamFamily {
    /// Classify a parameter name, `None` for names that are not filters
    pub fn classify(name: &str) -> Option<Self> {
        use Field::*;

        let family = match name {
            "end_year" => Self::Exact(EndYear),
            "start_year" => Self::Exact(StartYear),

            "sector" => Self::Substring(Sector),
            "country" => Self::Substring(Country),
            "region" => Self::Substring(Region),
            "topic" => Self::Substring(Topic),
            "pestle" => Self::Substring(Pestle),
            "source" => Self::Substring(Source),
            "title" => Self::Substring(Title),

            "intensity_min" => Self::Min(Intensity),
            "intensity_max" => Self::Max(Intensity),
            "relevance_min" => Self::Min(Relevance),
            "relevance_max" => Self::Max(Relevance),
            "likelihood_min" => Self::Min(Likelihood),
            "likelihood_max" => Self::Max(Likelihood),

            "added_after" => Self::After(Added),
            "added_before" => Self::Before(Added),
            "published_after" => Self::After(Published),
            "published_before" => Self::Before(Published),

            "topics" => Self::AnyOf(Topic),
            "sectors" => Self::AnyOf(Sector),
            "regions" => Self::AnyOf(Region),
            "pestles" => Self::AnyOf(Pestle),
            "sources" => Self::AnyOf(Source),
            "countries" => Self::AnyOf(Country),

            "end_years" => Self::YearsOrNull(EndYear),
            "start_years" => Self::YearsOrNull(StartYear),

            _ => return None,
        };
        Some(family)
    }

    /// Parse a raw value into a predicate fragment
    ///
    /// Returns `None` when the value imposes no constraint (empty or invalid).
    pub fn parse(&self, raw: &str) -> Option<Predicate> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        match *self {
            Self::Exact(field) => {
                parse_number(value).map(|n| Predicate::Eq(field, Value::Float(n)))
            }
            Self::Substring(field) => Some(Predicate::Contains(field, value.to_string())),
            Self::Min(field) => {
                parse_number(value).map(|n| Predicate::Gte(field, Value::Float(n)))
            }
            Self::Max(field) => {
                parse_number(value).map(|n| Predicate::Lte(field, Value::Float(n)))
            }
            Self::After(field) => {
                parse_timestamp(value).map(|ts| Predicate::Gte(field, Value::Timestamp(ts)))
            }
            Self::Before(field) => {
                parse_timestamp(value).map(|ts| Predicate::Lte(field, Value::Timestamp(ts)))
            }
            Self::AnyOf(field) => parse_any_of(field, value),
            Self::YearsOrNull(field) => parse_years_or_null(field, value),
        }
    }
}

/// Build the conjunction of all recognised filter parameters
///
/// Parameters are applied in name order so the compiled SQL is stable.
pub fn build_predicate<I, K, V>(params: I) -> Predicate
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut params: Vec<(K, V)> = params.into_iter().collect();
    params.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    let fragments = params.iter().filter_map(|(name, raw)| {
        let name = name.as_ref();
        let raw = raw.as_ref();
        let family = ParamFamily::classify(name)?;
        let fragment = family.parse(raw);
        if fragment.is_none() && !raw.trim().is_empty() {
            debug!(param = name, value = raw, "Ignoring unparseable filter value");
        }
        fragment
    });

    Predicate::and(fragments.collect::<Vec<_>>())
}

/// Parse a finite decimal number
fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a year token, truncating decimal forms toward zero
fn parse_year(token: &str) -> Option<i64> {
    if let Ok(year) = token.parse::<i64>() {
        return Some(year);
    }
    let n = parse_number(token)?.trunc();
    // i64::MAX is not exactly representable; stay strictly inside the range
    (-9.0e18..=9.0e18).contains(&n).then(|| n as i64)
}

/// Split a comma-joined value into trimmed, non-empty tokens
fn split_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn parse_any_of(field: Field, value: &str) -> Option<Predicate> {
    let mut seen = HashSet::new();
    let values: Vec<Value> = split_tokens(value)
        .filter(|t| seen.insert(*t))
        .map(|t| Value::Text(t.to_string()))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(Predicate::In(field, values))
    }
}

/// `end_years` / `start_years`: listed years, plus absent values if `null` is given
fn parse_years_or_null(field: Field, value: &str) -> Option<Predicate> {
    let mut years: Vec<Value> = Vec::new();
    let mut seen = HashSet::new();
    let mut include_null = false;

    for token in split_tokens(value) {
        if token.eq_ignore_ascii_case(NULL_TOKEN) {
            include_null = true;
            continue;
        }
        match parse_year(token) {
            Some(year) => {
                if seen.insert(year) {
                    years.push(Value::Int(year));
                }
            }
            None => debug!(field = %field, token, "Dropping invalid year token"),
        }
    }

    match (years.is_empty(), include_null) {
        (true, false) => None,
        (true, true) => Some(Predicate::IsNull(field)),
        (false, false) => Some(Predicate::In(field, years)),
        (false, true) => Some(Predicate::Or(vec![
            Predicate::In(field, years),
            Predicate::IsNull(field),
        ])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_classify_every_family() {
        assert_eq!(
            ParamFamily::classify("end_year"),
            Some(ParamFamily::Exact(Field::EndYear))
        );
        assert_eq!(
            ParamFamily::classify("title"),
            Some(ParamFamily::Substring(Field::Title))
        );
        assert_eq!(
            ParamFamily::classify("likelihood_max"),
            Some(ParamFamily::Max(Field::Likelihood))
        );
        assert_eq!(
            ParamFamily::classify("published_after"),
            Some(ParamFamily::After(Field::Published))
        );
        assert_eq!(
            ParamFamily::classify("countries"),
            Some(ParamFamily::AnyOf(Field::Country))
        );
        assert_eq!(
            ParamFamily::classify("start_years"),
            Some(ParamFamily::YearsOrNull(Field::StartYear))
        );
        assert_eq!(ParamFamily::classify("page"), None);
        assert_eq!(ParamFamily::classify("page_size"), None);
        assert_eq!(ParamFamily::classify("bogus"), None);
    }

    #[test]
    fn test_no_params_is_unconstrained() {
        assert!(build_predicate(params(&[])).is_all());
        assert!(build_predicate(params(&[("page", "2"), ("unknown", "x")])).is_all());
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let p = build_predicate(params(&[
            ("sector", ""),
            ("intensity_min", "  "),
            ("topics", ",,"),
        ]));
        assert!(p.is_all());
    }

    #[test]
    fn test_invalid_number_drops_only_that_param() {
        let p = build_predicate(params(&[("intensity_min", "abc"), ("intensity_max", "80")]));
        assert_eq!(p, Predicate::Lte(Field::Intensity, Value::Float(80.0)));

        assert!(build_predicate(params(&[("end_year", "NaN")])).is_all());
        assert!(build_predicate(params(&[("end_year", "inf")])).is_all());
    }

    #[test]
    fn test_range_params_combine() {
        let p = build_predicate(params(&[("intensity_min", "50"), ("intensity_max", "80")]));
        assert_eq!(
            p,
            Predicate::And(vec![
                Predicate::Lte(Field::Intensity, Value::Float(80.0)),
                Predicate::Gte(Field::Intensity, Value::Float(50.0)),
            ])
        );
    }

    #[test]
    fn test_substring_value_is_trimmed() {
        let p = build_predicate(params(&[("sector", "  energy ")]));
        assert_eq!(p, Predicate::Contains(Field::Sector, "energy".to_string()));
    }

    #[test]
    fn test_datetime_params() {
        let p = build_predicate(params(&[("added_after", "2017-01-01")]));
        assert_eq!(
            p,
            Predicate::Gte(
                Field::Added,
                Value::Timestamp(Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap())
            )
        );

        assert!(build_predicate(params(&[("published_before", "not-a-date")])).is_all());
    }

    #[test]
    fn test_any_of_splits_and_trims() {
        let p = build_predicate(params(&[("topics", "oil, gas ,,market")]));
        assert_eq!(
            p,
            Predicate::In(
                Field::Topic,
                vec![
                    Value::Text("oil".into()),
                    Value::Text("gas".into()),
                    Value::Text("market".into()),
                ]
            )
        );
    }

    #[test]
    fn test_any_of_deduplicated() {
        let p = build_predicate(params(&[("sectors", "Energy,Retail,Energy, Energy")]));
        assert_eq!(
            p,
            Predicate::In(
                Field::Sector,
                vec![Value::Text("Energy".into()), Value::Text("Retail".into())]
            )
        );
    }

    #[test]
    fn test_years_with_null_and_bogus() {
        let p = build_predicate(params(&[("end_years", "2017,null,bogus")]));
        assert_eq!(
            p,
            Predicate::Or(vec![
                Predicate::In(Field::EndYear, vec![Value::Int(2017)]),
                Predicate::IsNull(Field::EndYear),
            ])
        );
    }

    #[test]
    fn test_years_decimal_forms_truncate() {
        let p = build_predicate(params(&[("start_years", "2017.0, 2018.9, -3.5")]));
        assert_eq!(
            p,
            Predicate::In(
                Field::StartYear,
                vec![Value::Int(2017), Value::Int(2018), Value::Int(-3)]
            )
        );
    }

    #[test]
    fn test_years_only_null() {
        let p = build_predicate(params(&[("end_years", " NULL ")]));
        assert_eq!(p, Predicate::IsNull(Field::EndYear));
    }

    #[test]
    fn test_years_all_invalid_is_unconstrained() {
        assert!(build_predicate(params(&[("end_years", "")])).is_all());
        assert!(build_predicate(params(&[("end_years", "bogus")])).is_all());
        assert!(build_predicate(params(&[("end_years", "1e400,abc, ,")])).is_all());
    }

    #[test]
    fn test_years_deduplicated() {
        let p = build_predicate(params(&[("end_years", "2017,2017.0,2017")]));
        assert_eq!(p, Predicate::In(Field::EndYear, vec![Value::Int(2017)]));
    }

    #[test]
    fn test_accepts_pair_slices() {
        let p = build_predicate([("pestles", "Economic")]);
        assert_eq!(
            p,
            Predicate::In(Field::Pestle, vec![Value::Text("Economic".into())])
        );
    }
}
