//! # Sale Repository
//!
//! Sales, their cart lines, and the sales report.
//!
//! ## Storage Layout
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────────┐
//! │ sales                    │ 1    n │ sale_lines                   │
//! │ id, transaction_number,  │───────►│ sale_id, position, item_id,  │
//! │ branch, client_id, ...   │        │ price, quantity, subtotal    │
//! └──────────────────────────┘        └──────────────────────────────┘
//!            │ client_id                          │ item_id
//!            ▼                                    ▼
//!         clients                           trading_items   (populate)
//! ```
//!
//! A sale and its lines are always written in one transaction. Deleting a
//! sale cascades to its lines.

use std::collections::{HashMap, HashSet};

use garage_core::query::{schema, Page, ReportPlan, SearchQuery, SortOrder};
use garage_core::{
    cart_total, CartLine, Client, Money, PopulatedSale, Sale, SaleFlags, SalePatch, TradingItem,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::client::CLIENTS;
use super::trading::TRADING_ITEMS;
use super::with_duplicate_value;
use crate::error::{DbError, DbResult};
use crate::listing::{Table, MAX_BOUND_IDS};

const SALES: Table = Table {
    name: "sales",
    columns: "id, transaction_number, branch, client_id, discount_cents, \
              total_price_cents, paid, date_issued, recurring",
};

const NEWEST_FIRST: SortOrder = SortOrder::newest_first("date_issued");

/// A stored cart line tagged with its sale.
#[derive(sqlx::FromRow)]
struct LineRow {
    sale_id: String,
    #[sqlx(flatten)]
    line: CartLine,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Every sale, newest first, populated.
    pub async fn list_all(&self) -> DbResult<Vec<PopulatedSale>> {
        let sales = SALES.all(&self.pool, Some(NEWEST_FIRST)).await?;
        self.expand(sales).await
    }

    /// Paginated search on transaction number, with client/branch/paid filters.
    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<PopulatedSale>> {
        let page: Page<Sale> = SALES.search(&self.pool, &schema::SALES, query).await?;
        let records = self.expand(page.records).await?;
        Ok(Page {
            records,
            pagination: page.pagination,
        })
    }

    /// The sale with its cart, without expanding references.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let Some(sale) = SALES.get::<Sale>(&self.pool, id).await? else {
            return Ok(None);
        };
        let mut sales = [sale];
        self.attach_carts(&mut sales).await?;
        let [sale] = sales;
        Ok(Some(sale))
    }

    pub async fn get_populated(&self, id: &str) -> DbResult<Option<PopulatedSale>> {
        match self.get_by_id(id).await? {
            Some(sale) => Ok(self.populate(vec![sale]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Runs a resolved report: every matching sale, unpaginated.
    pub async fn report(&self, plan: &ReportPlan) -> DbResult<Vec<PopulatedSale>> {
        let sales: Vec<Sale> = SALES
            .fetch(&self.pool, &plan.filter, Some(plan.order), None)
            .await?;
        info!(clauses = plan.filter.len(), count = sales.len(), "Sales report");
        self.expand(sales).await
    }

    /// Inserts a sale and its cart.
    ///
    /// A `transaction_number` of 0 means "assign the next one"; the number is
    /// computed inside the INSERT so concurrent writers never share one.
    pub async fn insert(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(id = %sale.id, lines = sale.cart.len(), "Inserting sale");

        let requested = (sale.transaction_number > 0).then_some(sale.transaction_number);

        let mut tx = self.pool.begin().await?;

        let transaction_number: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sales (
                id, transaction_number, branch, client_id, discount_cents,
                total_price_cents, paid, date_issued, recurring
            ) VALUES (
                ?1,
                COALESCE(?2, (SELECT COALESCE(MAX(transaction_number), 0) + 1 FROM sales)),
                ?3, ?4, ?5, ?6, ?7, ?8, ?9
            )
            RETURNING transaction_number
            "#,
        )
        .bind(&sale.id)
        .bind(requested)
        .bind(&sale.branch)
        .bind(&sale.client_id)
        .bind(sale.discount_cents)
        .bind(sale.total_price_cents)
        .bind(sale.paid)
        .bind(sale.date_issued)
        .bind(sale.recurring)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let value = requested.map(|n| n.to_string()).unwrap_or_default();
            with_duplicate_value(e.into(), &value)
        })?;

        insert_lines(&mut *tx, &sale.id, &sale.cart).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(id = %sale.id, transaction_number = transaction_number, "Sale stored");

        Ok(Sale {
            transaction_number,
            ..sale.clone()
        })
    }

    /// Applies the patch. A new cart replaces the old one. When the cart or
    /// discount changes without an explicit total, the total is recomputed.
    pub async fn update(&self, id: &str, patch: &SalePatch) -> DbResult<PopulatedSale> {
        debug!(id = %id, "Updating sale");

        let mut tx = self.pool.begin().await?;

        let current: Option<Sale> = sqlx::query_as(
            r#"
            SELECT id, transaction_number, branch, client_id, discount_cents,
                   total_price_cents, paid, date_issued, recurring
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Err(DbError::not_found("Sale", id));
        };

        let total_price_cents = match (patch.total_price_cents, &patch.cart) {
            (Some(total), _) => Some(total),
            (None, Some(cart)) => {
                let discount = patch.discount_cents.unwrap_or(current.discount_cents);
                Some((cart_total(cart) - Money::from_cents(discount)).cents())
            }
            (None, None) => match patch.discount_cents {
                Some(discount) => {
                    let cart = lines_for(&mut *tx, id).await?;
                    Some((cart_total(&cart) - Money::from_cents(discount)).cents())
                }
                None => None,
            },
        };

        sqlx::query(
            r#"
            UPDATE sales SET
                transaction_number = COALESCE(?2, transaction_number),
                branch = COALESCE(?3, branch),
                client_id = COALESCE(?4, client_id),
                discount_cents = COALESCE(?5, discount_cents),
                total_price_cents = COALESCE(?6, total_price_cents),
                paid = COALESCE(?7, paid),
                date_issued = COALESCE(?8, date_issued),
                recurring = COALESCE(?9, recurring)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.transaction_number)
        .bind(&patch.branch)
        .bind(&patch.client_id)
        .bind(patch.discount_cents)
        .bind(total_price_cents)
        .bind(patch.paid)
        .bind(patch.date_issued)
        .bind(patch.recurring)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let value = patch.transaction_number.map(|n| n.to_string()).unwrap_or_default();
            with_duplicate_value(e.into(), &value)
        })?;

        if let Some(cart) = &patch.cart {
            sqlx::query("DELETE FROM sale_lines WHERE sale_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_lines(&mut *tx, id, cart).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get_populated(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Writes only the flags that are present.
    pub async fn set_flags(&self, id: &str, flags: SaleFlags) -> DbResult<PopulatedSale> {
        debug!(id = %id, paid = ?flags.paid, recurring = ?flags.recurring, "Updating sale flags");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                paid = COALESCE(?2, paid),
                recurring = COALESCE(?3, recurring)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(flags.paid)
        .bind(flags.recurring)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        self.get_populated(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        SALES.delete_many(&self.pool, ids).await
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    async fn expand(&self, mut sales: Vec<Sale>) -> DbResult<Vec<PopulatedSale>> {
        self.attach_carts(&mut sales).await?;
        self.populate(sales).await
    }

    /// Loads the cart lines of every sale, [`MAX_BOUND_IDS`] sales per query.
    async fn attach_carts(&self, sales: &mut [Sale]) -> DbResult<()> {
        let mut carts: HashMap<String, Vec<CartLine>> = HashMap::new();

        for chunk in sales.chunks(MAX_BOUND_IDS) {
            let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
                "SELECT sale_id, item_id, item_price_cents, quantity, sub_total_cents \
                 FROM sale_lines WHERE sale_id IN (",
            );
            let mut separated = builder.separated(", ");
            for sale in chunk {
                separated.push_bind(sale.id.clone());
            }
            separated.push_unseparated(") ORDER BY sale_id, position");

            let rows: Vec<LineRow> = builder.build_query_as().fetch_all(&self.pool).await?;
            for row in rows {
                carts.entry(row.sale_id).or_default().push(row.line);
            }
        }

        for sale in sales.iter_mut() {
            sale.cart = carts.remove(&sale.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Expands client and cart item references.
    async fn populate(&self, sales: Vec<Sale>) -> DbResult<Vec<PopulatedSale>> {
        let client_ids = unique(sales.iter().map(|s| s.client_id.as_str()));
        let item_ids = unique(
            sales
                .iter()
                .flat_map(|s| s.cart.iter().map(|l| l.item_id.as_str())),
        );

        let client_index: HashMap<String, Client> = CLIENTS
            .get_many::<Client>(&self.pool, &client_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let item_index: HashMap<String, TradingItem> = TRADING_ITEMS
            .get_many::<TradingItem>(&self.pool, &item_ids)
            .await?
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();

        Ok(sales
            .into_iter()
            .map(|sale| {
                let client = client_index.get(&sale.client_id).cloned();
                let items = unique(sale.cart.iter().map(|l| l.item_id.as_str()))
                    .iter()
                    .filter_map(|id| item_index.get(id).cloned())
                    .collect();
                PopulatedSale {
                    sale,
                    client,
                    items,
                }
            })
            .collect())
    }
}

/// Distinct values in first-seen order.
fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

async fn insert_lines(conn: &mut SqliteConnection, sale_id: &str, cart: &[CartLine]) -> DbResult<()> {
    for (position, line) in cart.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                sale_id, position, item_id, item_price_cents, quantity, sub_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(sale_id)
        .bind(position as i64)
        .bind(&line.item_id)
        .bind(line.item_price_cents)
        .bind(line.quantity)
        .bind(line.sub_total_cents)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn lines_for(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT item_id, item_price_cents, quantity, sub_total_cents
        FROM sale_lines
        WHERE sale_id = ?1
        ORDER BY position
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(lines)
}
