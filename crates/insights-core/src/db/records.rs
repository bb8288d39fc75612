//! Record insertion, listing and lookup

use rusqlite::params;
use tracing::debug;

use super::{Database, RECORD_COLUMNS};
use crate::error::Result;
use crate::models::{NewRecord, Record};
use crate::predicate::Predicate;
use crate::timestamp::{format_timestamp, parse_stored_timestamp};

/// Newest first; records without `added` go last, ties broken by id
const LIST_ORDER: &str = "ORDER BY added IS NULL, added DESC, id ASC";

impl Database {
    /// Insert a batch of records in a single transaction
    ///
    /// Returns the number of records inserted.
    pub fn insert_records(&self, records: &[NewRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare_cached(
                r#"
                INSERT INTO records (end_year, intensity, sector, topic, insight, url, region,
                                     start_year, impact, added, published, country, relevance,
                                     pestle, source, title, likelihood)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;

            for r in records {
                stmt.execute(params![
                    r.end_year,
                    r.intensity,
                    r.sector,
                    r.topic,
                    r.insight,
                    r.url,
                    r.region,
                    r.start_year,
                    r.impact,
                    r.added.as_ref().map(format_timestamp),
                    r.published.as_ref().map(format_timestamp),
                    r.country,
                    r.relevance,
                    r.pestle,
                    r.source,
                    r.title,
                    r.likelihood,
                ])?;
            }
        }

        tx.commit()?;
        debug!(count = records.len(), "Inserted record batch");
        Ok(records.len())
    }

    /// List records matching `predicate`, newest first
    pub fn list_records(
        &self,
        predicate: &Predicate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Record>> {
        let conn = self.conn()?;
        let filter = predicate.to_sql();

        let sql = format!(
            "SELECT {} FROM records {} {} LIMIT ? OFFSET ?",
            RECORD_COLUMNS,
            filter.where_clause(),
            LIST_ORDER
        );

        let mut params = filter.params_refs();
        params.push(&limit);
        params.push(&offset);

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params.as_slice(), Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count records matching `predicate`
    pub fn count_records(&self, predicate: &Predicate) -> Result<i64> {
        let conn = self.conn()?;
        let filter = predicate.to_sql();

        let sql = format!("SELECT COUNT(*) FROM records {}", filter.where_clause());
        let count: i64 =
            conn.query_row(&sql, filter.params_refs().as_slice(), |row| row.get(0))?;

        Ok(count)
    }

    /// Get a single record by ID
    pub fn get_record(&self, id: i64) -> Result<Option<Record>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM records WHERE id = ?", RECORD_COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], Self::row_to_record)?;

        Ok(rows.next().transpose()?)
    }

    /// Load every record matching `predicate` (no pagination)
    pub fn all_records(&self, predicate: &Predicate) -> Result<Vec<Record>> {
        self.list_records(predicate, -1, 0)
    }

    pub(crate) fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
        let added: Option<String> = row.get(10)?;
        let published: Option<String> = row.get(11)?;
        Ok(Record {
            id: row.get(0)?,
            end_year: row.get(1)?,
            intensity: row.get(2)?,
            sector: row.get(3)?,
            topic: row.get(4)?,
            insight: row.get(5)?,
            url: row.get(6)?,
            region: row.get(7)?,
            start_year: row.get(8)?,
            impact: row.get(9)?,
            added: added.as_deref().and_then(parse_stored_timestamp),
            published: published.as_deref().and_then(parse_stored_timestamp),
            country: row.get(12)?,
            relevance: row.get(13)?,
            pestle: row.get(14)?,
            source: row.get(15)?,
            title: row.get(16)?,
            likelihood: row.get(17)?,
        })
    }
}
