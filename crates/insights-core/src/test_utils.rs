//! Test utilities for insights-core
//!
//! A small fixture dataset whose statistics are easy to work out by hand:
//!
//! | # | title | start | end | int | rel | lik | sector | region |
//! |---|-------|-------|-----|-----|-----|-----|--------|--------|
//! | 1 | Oil output | - | 2017 | 60 | 3 | 4 | Energy | Northern America |
//! | 2 | Gas demand | 2016 | 2018 | 80 | 4 | 3 | Energy | Western Asia |
//! | 3 | Market outlook | - | - | 20 | 2 | 3 | Financial services | World |
//! | 4 | Energy without intensity | 2017 | - | - | 30 | - | Energy | World |
//! | 5 | Policy note | - | 2019 | 50 | - | 3 | Government | Europe |
//! | 6 | Bare record | - | 2020 | - | - | - | - | - |
//! | 7 | Zero start year | 0 | 2021 | 10 | 1 | 1 | Retail | Asia |
//!
//! Records are inserted in this order, so ids 1..=7 match the rows above.

use chrono::{DateTime, TimeZone, Utc};

use crate::db::Database;
use crate::models::NewRecord;

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).single()
}

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

/// The fixture rows described in the module docs
pub fn fixture_records() -> Vec<NewRecord> {
    vec![
        NewRecord {
            title: text("Oil output"),
            end_year: Some(2017),
            intensity: Some(60),
            relevance: Some(3),
            likelihood: Some(4),
            sector: text("Energy"),
            topic: text("oil"),
            region: text("Northern America"),
            country: text("United States of America"),
            pestle: text("Economic"),
            source: text("EIA"),
            added: ts(2017, 1, 20, 3, 51, 25),
            published: ts(2017, 1, 9, 0, 0, 0),
            ..Default::default()
        },
        NewRecord {
            title: text("Gas demand"),
            start_year: Some(2016),
            end_year: Some(2018),
            intensity: Some(80),
            relevance: Some(4),
            likelihood: Some(3),
            sector: text("Energy"),
            topic: text("gas"),
            region: text("Western Asia"),
            country: text("Saudi Arabia"),
            pestle: text("Industries"),
            source: text("Reuters"),
            added: ts(2017, 1, 21, 10, 0, 0),
            published: ts(2016, 12, 1, 0, 0, 0),
            ..Default::default()
        },
        NewRecord {
            title: text("Market outlook"),
            intensity: Some(20),
            relevance: Some(2),
            likelihood: Some(3),
            sector: text("Financial services"),
            topic: text("market"),
            region: text("World"),
            pestle: text("Economic"),
            source: text("Bloomberg"),
            added: ts(2017, 2, 1, 0, 0, 0),
            ..Default::default()
        },
        NewRecord {
            title: text("Energy without intensity"),
            start_year: Some(2017),
            relevance: Some(30),
            sector: text("Energy"),
            topic: text("oil"),
            region: text("World"),
            pestle: text("Political"),
            source: text("EIA"),
            ..Default::default()
        },
        NewRecord {
            title: text("Policy note"),
            end_year: Some(2019),
            intensity: Some(50),
            likelihood: Some(3),
            sector: text("Government"),
            topic: text("policy"),
            region: text("Europe"),
            country: text("Germany"),
            pestle: text("Political"),
            source: text("Reuters"),
            added: ts(2016, 6, 15, 12, 0, 0),
            ..Default::default()
        },
        NewRecord {
            title: text("Bare record"),
            end_year: Some(2020),
            ..Default::default()
        },
        NewRecord {
            title: text("Zero start year"),
            start_year: Some(0),
            end_year: Some(2021),
            intensity: Some(10),
            relevance: Some(1),
            likelihood: Some(1),
            sector: text("Retail"),
            topic: text("consumption"),
            region: text("Asia"),
            country: text("India"),
            pestle: text("Social"),
            source: text("The Economist"),
            added: ts(2016, 1, 1, 0, 0, 0),
            ..Default::default()
        },
    ]
}

/// A fresh database loaded with `fixture_records`
pub fn seeded_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.insert_records(&fixture_records()).unwrap();
    db
}
