//! Aggregate statistics, filter options and facets
//!
//! Every statistic runs its own query over the filtered view, so each one
//! degrades independently to null/zero/empty on an empty view.

use super::{Database, DbConn};
use crate::error::Result;
use crate::models::*;
use crate::predicate::{Field, Predicate, SqlFilter};

impl Database {
    /// Compute the full summary for the records matching `predicate`
    pub fn record_stats(&self, predicate: &Predicate) -> Result<RecordStats> {
        let conn = self.conn()?;
        let filter = predicate.to_sql();

        let (avg_intensity, avg_likelihood, avg_relevance, total_records) =
            Self::score_averages(&conn, &filter)?;

        Ok(RecordStats {
            avg_intensity,
            avg_likelihood,
            avg_relevance,
            total_records,
            sectors: Self::sector_stats(&conn, &filter)?,
            topics: Self::topic_stats(&conn, &filter)?,
            regions: Self::region_stats(&conn, &filter)?,
            yearly_trends: Self::yearly_trends(&conn, &filter)?,
            likelihoods: Self::likelihood_stats(&conn, &filter)?,
        })
    }

    /// Averages over non-null scores plus the view size
    fn score_averages(
        conn: &DbConn,
        filter: &SqlFilter,
    ) -> Result<(Option<f64>, Option<f64>, Option<f64>, i64)> {
        let sql = format!(
            "SELECT AVG(intensity), AVG(likelihood), AVG(relevance), COUNT(*) FROM records {}",
            filter.where_clause()
        );
        let row = conn.query_row(&sql, filter.params_refs().as_slice(), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        Ok(row)
    }

    /// Group by a categorical column, averaging intensity
    ///
    /// Records without the column or without intensity are left out.
    fn intensity_by(
        conn: &DbConn,
        filter: &SqlFilter,
        field: Field,
    ) -> Result<Vec<(String, f64, i64)>> {
        let column = field.column();
        let sql = format!(
            r#"
            SELECT {col}, AVG(intensity) AS avg_intensity, COUNT(*)
            FROM records
            {where_clause}
            GROUP BY {col}
            ORDER BY avg_intensity DESC, {col} ASC
            "#,
            col = column,
            where_clause = filter
                .where_clause_and(&format!("{} IS NOT NULL AND intensity IS NOT NULL", column)),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(filter.params_refs().as_slice(), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn sector_stats(conn: &DbConn, filter: &SqlFilter) -> Result<Vec<SectorStat>> {
        Ok(Self::intensity_by(conn, filter, Field::Sector)?
            .into_iter()
            .map(|(sector, intensity, count)| SectorStat {
                sector,
                intensity,
                count,
            })
            .collect())
    }

    fn region_stats(conn: &DbConn, filter: &SqlFilter) -> Result<Vec<RegionStat>> {
        Ok(Self::intensity_by(conn, filter, Field::Region)?
            .into_iter()
            .map(|(region, intensity, count)| RegionStat {
                region,
                intensity,
                count,
            })
            .collect())
    }

    fn topic_stats(conn: &DbConn, filter: &SqlFilter) -> Result<Vec<TopicStat>> {
        let sql = format!(
            r#"
            SELECT topic, COUNT(*) AS n
            FROM records
            {}
            GROUP BY topic
            ORDER BY n DESC, topic ASC
            "#,
            filter.where_clause_and("topic IS NOT NULL")
        );

        let mut stmt = conn.prepare(&sql)?;
        let topics = stmt
            .query_map(filter.params_refs().as_slice(), |row| {
                Ok(TopicStat {
                    topic: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    fn likelihood_stats(conn: &DbConn, filter: &SqlFilter) -> Result<Vec<LikelihoodStat>> {
        let sql = format!(
            r#"
            SELECT likelihood, COUNT(*) AS n
            FROM records
            {}
            GROUP BY likelihood
            ORDER BY n DESC, likelihood ASC
            "#,
            filter.where_clause_and("likelihood IS NOT NULL")
        );

        let mut stmt = conn.prepare(&sql)?;
        let likelihoods = stmt
            .query_map(filter.params_refs().as_slice(), |row| {
                Ok(LikelihoodStat {
                    likelihood: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(likelihoods)
    }

    /// Year buckets keyed by start_year, falling back to end_year
    ///
    /// Absent scores count as 0 here so the series stays continuous; records
    /// with no year or no score at all are left out, as are years <= 0.
    fn yearly_trends(conn: &DbConn, filter: &SqlFilter) -> Result<Vec<YearlyTrend>> {
        let sql = format!(
            r#"
            SELECT COALESCE(start_year, end_year) AS year,
                   AVG(COALESCE(intensity, 0)),
                   AVG(COALESCE(relevance, 0)),
                   AVG(COALESCE(likelihood, 0)),
                   COUNT(*)
            FROM records
            {}
            GROUP BY year
            ORDER BY year ASC
            "#,
            filter.where_clause_and(
                "(start_year IS NOT NULL OR end_year IS NOT NULL) \
                 AND (intensity IS NOT NULL OR relevance IS NOT NULL OR likelihood IS NOT NULL) \
                 AND COALESCE(start_year, end_year) > 0"
            )
        );

        let mut stmt = conn.prepare(&sql)?;
        let trends = stmt
            .query_map(filter.params_refs().as_slice(), |row| {
                Ok(YearlyTrend {
                    year: row.get(0)?,
                    intensity: row.get(1)?,
                    relevance: row.get(2)?,
                    likelihood: row.get(3)?,
                    count: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(trends)
    }

    // ========== Facets ==========

    /// Distinct values of every menu field across the whole store
    pub fn filter_options(&self) -> Result<FilterOptions> {
        let conn = self.conn()?;

        Ok(FilterOptions {
            end_years: Self::distinct_values(&conn, Field::EndYear)?,
            topics: Self::distinct_values(&conn, Field::Topic)?,
            sectors: Self::distinct_values(&conn, Field::Sector)?,
            regions: Self::distinct_values(&conn, Field::Region)?,
            pestles: Self::distinct_values(&conn, Field::Pestle)?,
            sources: Self::distinct_values(&conn, Field::Source)?,
            countries: Self::distinct_values(&conn, Field::Country)?,
        })
    }

    /// Sorted distinct non-null, non-empty values of one column
    fn distinct_values<T: rusqlite::types::FromSql>(
        conn: &DbConn,
        field: Field,
    ) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT DISTINCT {col} FROM records \
             WHERE {col} IS NOT NULL AND {col} <> '' ORDER BY {col} ASC",
            col = field.column()
        );

        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<T>, _>>()?;
        Ok(values)
    }

    /// Value counts of every menu field over the records matching `predicate`
    pub fn facets(&self, predicate: &Predicate) -> Result<Facets> {
        let conn = self.conn()?;
        let filter = predicate.to_sql();

        Ok(Facets {
            end_year: Self::facet_counts(&conn, &filter, Field::EndYear)?,
            topic: Self::facet_counts(&conn, &filter, Field::Topic)?,
            sector: Self::facet_counts(&conn, &filter, Field::Sector)?,
            region: Self::facet_counts(&conn, &filter, Field::Region)?,
            pestle: Self::facet_counts(&conn, &filter, Field::Pestle)?,
            source: Self::facet_counts(&conn, &filter, Field::Source)?,
            country: Self::facet_counts(&conn, &filter, Field::Country)?,
        })
    }

    fn facet_counts<T>(
        conn: &DbConn,
        filter: &SqlFilter,
        field: Field,
    ) -> Result<Vec<FacetItem<T>>>
    where
        T: rusqlite::types::FromSql + Clone,
    {
        let column = field.column();
        let present = format!("{col} IS NOT NULL AND {col} <> ''", col = column);
        let sql = format!(
            "SELECT {col}, COUNT(*) FROM records {where_clause} \
             GROUP BY {col} ORDER BY {col} ASC",
            col = column,
            where_clause = filter.where_clause_and(&present),
        );

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(filter.params_refs().as_slice(), |row| {
                Ok(FacetItem::new(row.get::<_, T>(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }
}
