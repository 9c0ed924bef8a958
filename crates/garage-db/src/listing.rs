//! # Listing Queries
//!
//! Renders a [`ReportFilter`] into SQL and runs the shared list/search/count/
//! delete queries every repository needs.
//!
//! ## Clause Rendering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Clause            SQL                                                  │
//! │  ──────            ───                                                  │
//! │  Equals            col = ?                                              │
//! │  SubstringMatch    instr(lower(CAST(col AS TEXT)), lower(?)) > 0        │
//! │  BooleanEquals     col = ?                                              │
//! │  DateRange         col >= ? AND col < ?                                 │
//! │  LessThan          col < ?                                              │
//! │                                                                         │
//! │  Clauses are joined with AND. An empty filter renders no WHERE.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `instr` is used instead of `LIKE` so `%` and `_` in search input match
//! literally.

use garage_core::query::{
    Clause, FilterSchema, Page, PageRequest, ReportFilter, SearchQuery, SortOrder,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Most ids bound into one `IN (...)` list. SQLite caps the number of bound
/// parameters per statement, so larger id sets are split across statements.
pub const MAX_BOUND_IDS: usize = 500;

/// Appends ` WHERE ...` for the filter, or nothing when it is empty.
pub fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ReportFilter) {
    for (index, clause) in filter.into_iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        match clause {
            Clause::Equals { field, value } => {
                builder.push(*field).push(" = ").push_bind(value.clone());
            }
            Clause::SubstringMatch { field, needle } => {
                builder
                    .push("instr(lower(CAST(")
                    .push(*field)
                    .push(" AS TEXT)), lower(")
                    .push_bind(needle.clone())
                    .push(")) > 0");
            }
            Clause::BooleanEquals { field, value } => {
                builder.push(*field).push(" = ").push_bind(*value);
            }
            Clause::DateRange { field, interval } => {
                builder
                    .push(*field)
                    .push(" >= ")
                    .push_bind(interval.start)
                    .push(" AND ")
                    .push(*field)
                    .push(" < ")
                    .push_bind(interval.end);
            }
            Clause::LessThan { field, bound } => {
                builder.push(*field).push(" < ").push_bind(*bound);
            }
        }
    }
}

/// Appends ` ORDER BY ...`. Insertion order breaks ties so pages are stable.
fn push_order(builder: &mut QueryBuilder<'_, Sqlite>, order: Option<SortOrder>) {
    match order {
        Some(order) if order.descending => {
            builder.push(" ORDER BY ").push(order.field).push(" DESC, rowid DESC");
        }
        Some(order) => {
            builder.push(" ORDER BY ").push(order.field).push(" ASC, rowid ASC");
        }
        None => {
            builder.push(" ORDER BY rowid ASC");
        }
    }
}

/// A table and the columns its entity maps from.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static str,
}

impl Table {
    fn select(&self) -> QueryBuilder<'static, Sqlite> {
        QueryBuilder::new(format!("SELECT {} FROM {}", self.columns, self.name))
    }

    /// Every row matching the filter, in the given order.
    pub async fn fetch<T>(
        &self,
        pool: &SqlitePool,
        filter: &ReportFilter,
        order: Option<SortOrder>,
        page: Option<PageRequest>,
    ) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = self.select();
        push_filter(&mut builder, filter);
        push_order(&mut builder, order);
        if let Some(page) = page {
            builder
                .push(" LIMIT ")
                .push_bind(page.limit() as i64)
                .push(" OFFSET ")
                .push_bind(page.offset() as i64);
        }

        let rows = builder.build_query_as::<T>().fetch_all(pool).await?;
        debug!(table = self.name, clauses = filter.len(), count = rows.len(), "Fetched rows");
        Ok(rows)
    }

    pub async fn count(&self, pool: &SqlitePool, filter: &ReportFilter) -> DbResult<u64> {
        let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.name));
        push_filter(&mut builder, filter);

        let total = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    /// One page of a listing plus its pagination block.
    pub async fn search<T>(
        &self,
        pool: &SqlitePool,
        schema: &FilterSchema,
        query: &SearchQuery,
    ) -> DbResult<Page<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let filter = schema.build(query);
        let page = schema.page(query);

        let records = self.fetch(pool, &filter, schema.order, Some(page)).await?;
        let total = self.count(pool, &filter).await?;

        debug!(
            entity = schema.entity,
            page = page.page_number(),
            total = total,
            "Search page"
        );
        Ok(Page::paginated(records, page, total))
    }

    pub async fn all<T>(&self, pool: &SqlitePool, order: Option<SortOrder>) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.fetch(pool, &ReportFilter::all(), order, None).await
    }

    pub async fn get<T>(&self, pool: &SqlitePool, id: &str) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = self.select();
        builder.push(" WHERE id = ").push_bind(id.to_string());
        let row = builder.build_query_as::<T>().fetch_optional(pool).await?;
        Ok(row)
    }

    /// Rows whose id is in `ids`. Missing ids are skipped. Rows come back in
    /// insertion order within each chunk of [`MAX_BOUND_IDS`] ids.
    pub async fn get_many<T>(&self, pool: &SqlitePool, ids: &[String]) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut rows = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_BOUND_IDS) {
            let mut builder = self.select();
            push_id_list(&mut builder, chunk);
            push_order(&mut builder, None);
            rows.extend(builder.build_query_as::<T>().fetch_all(pool).await?);
        }
        Ok(rows)
    }

    /// Deletes the rows with the given ids. Unknown ids are ignored. All
    /// chunks are deleted in one transaction.
    pub async fn delete_many(&self, pool: &SqlitePool, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = pool.begin().await?;
        let mut deleted = 0;
        for chunk in ids.chunks(MAX_BOUND_IDS) {
            let mut builder = QueryBuilder::new(format!("DELETE FROM {}", self.name));
            push_id_list(&mut builder, chunk);
            deleted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(table = self.name, count = deleted, "Deleted rows");
        Ok(deleted)
    }
}

/// Appends ` WHERE id IN (?, ...)`. Callers keep `ids` within [`MAX_BOUND_IDS`].
fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[String]) {
    builder.push(" WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use garage_core::query::{DateInterval, FilterBuilder};

    fn render(filter: &ReportFilter) -> String {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM t");
        push_filter(&mut builder, filter);
        builder.sql().to_string()
    }

    #[test]
    fn test_empty_filter_renders_no_where() {
        assert_eq!(render(&ReportFilter::all()), "SELECT * FROM t");
    }

    #[test]
    fn test_clause_rendering() {
        let interval = DateInterval::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        );
        let filter = FilterBuilder::new()
            .substring("name", Some("ana"))
            .equals("client_id", Some("c-1"))
            .flag("paid", Some("true"))
            .date_range("date_issued", interval)
            .less_than("quantity", 10)
            .build();

        assert_eq!(
            render(&filter),
            "SELECT * FROM t WHERE instr(lower(CAST(name AS TEXT)), lower(?)) > 0 \
             AND client_id = ? AND paid = ? \
             AND date_issued >= ? AND date_issued < ? AND quantity < ?"
        );
    }
}
