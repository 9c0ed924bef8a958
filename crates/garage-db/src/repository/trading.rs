//! # Trading Item Repository
//!
//! Stocked items sold over the counter.
//!
//! ## Stock Adjustments
//! ```text
//! PATCH /{id}/add-quantity { quantityToAdd: -4 }
//!        │
//!        ▼
//! UPDATE trading_items SET quantity = MAX(quantity + ?, 0)   (single statement)
//!        │
//!        ▼
//! quantity 3 → 0 (clamped, never negative)
//! ```

use garage_core::query::{schema, FilterBuilder, Page, SearchQuery};
use garage_core::{TradingItem, TradingItemPatch, LOW_STOCK_THRESHOLD};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::listing::Table;

pub(crate) const TRADING_ITEMS: Table = Table {
    name: "trading_items",
    columns: "id, category, size, brand, description, quantity, unit, selling_price_cents",
};

/// Repository for trading item database operations.
#[derive(Debug, Clone)]
pub struct TradingRepository {
    pool: SqlitePool,
}

impl TradingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TradingRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<TradingItem>> {
        TRADING_ITEMS.all(&self.pool, None).await
    }

    /// Paginated search on size.
    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<TradingItem>> {
        TRADING_ITEMS
            .search(&self.pool, &schema::TRADING_ITEMS, query)
            .await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TradingItem>> {
        TRADING_ITEMS.get(&self.pool, id).await
    }

    /// Items with fewer than [`LOW_STOCK_THRESHOLD`] units.
    pub async fn low_stock(&self) -> DbResult<Vec<TradingItem>> {
        let filter = FilterBuilder::new()
            .less_than("quantity", LOW_STOCK_THRESHOLD)
            .build();
        let items: Vec<TradingItem> = TRADING_ITEMS.fetch(&self.pool, &filter, None, None).await?;
        debug!(count = items.len(), "Low stock items");
        Ok(items)
    }

    pub async fn insert(&self, item: &TradingItem) -> DbResult<TradingItem> {
        debug!(id = %item.id, "Inserting trading item");

        sqlx::query(
            r#"
            INSERT INTO trading_items (
                id, category, size, brand, description,
                quantity, unit, selling_price_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.category)
        .bind(&item.size)
        .bind(&item.brand)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.selling_price_cents)
        .execute(&self.pool)
        .await?;

        Ok(item.clone())
    }

    pub async fn update(&self, id: &str, patch: &TradingItemPatch) -> DbResult<TradingItem> {
        debug!(id = %id, "Updating trading item");

        let result = sqlx::query(
            r#"
            UPDATE trading_items SET
                category = COALESCE(?2, category),
                size = COALESCE(?3, size),
                brand = COALESCE(?4, brand),
                description = COALESCE(?5, description),
                quantity = COALESCE(?6, quantity),
                unit = COALESCE(?7, unit),
                selling_price_cents = COALESCE(?8, selling_price_cents)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.category)
        .bind(&patch.size)
        .bind(&patch.brand)
        .bind(&patch.description)
        .bind(patch.quantity)
        .bind(&patch.unit)
        .bind(patch.selling_price_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Trading item", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Trading item", id))
    }

    /// Adds `delta` units (negative to remove), clamping at zero.
    ///
    /// The row is only written when the sum stays within `i64`; a delta that
    /// would overflow leaves the quantity untouched and returns
    /// [`DbError::Overflow`].
    pub async fn add_quantity(&self, id: &str, delta: i64) -> DbResult<TradingItem> {
        debug!(id = %id, delta = %delta, "Adjusting trading item quantity");

        // Largest stored quantity the delta can be added to.
        let ceiling = if delta > 0 { i64::MAX - delta } else { i64::MAX };

        let result = sqlx::query(
            r#"
            UPDATE trading_items
            SET quantity = MAX(quantity + ?2, 0)
            WHERE id = ?1 AND quantity <= ?3
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(ceiling)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await? {
                Some(_) => Err(DbError::Overflow {
                    field: "quantity".to_string(),
                }),
                None => Err(DbError::not_found("Trading item", id)),
            };
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Trading item", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        TRADING_ITEMS.delete_many(&self.pool, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_trading_item, test_db};

    #[tokio::test]
    async fn test_low_stock() {
        let db = test_db().await;
        seed_trading_item(&db, "205/55 R16", 4).await;
        seed_trading_item(&db, "195/65 R15", 9).await;
        seed_trading_item(&db, "225/45 R17", 10).await;
        seed_trading_item(&db, "215/60 R16", 40).await;

        let low = db.trading().low_stock().await.unwrap();
        let sizes: Vec<&str> = low.iter().map(|i| i.size.as_str()).collect();
        assert_eq!(sizes, ["205/55 R16", "195/65 R15"]);
    }

    #[tokio::test]
    async fn test_add_quantity_clamps_at_zero() {
        let db = test_db().await;
        let item = seed_trading_item(&db, "205/55 R16", 3).await;

        let updated = db.trading().add_quantity(&item.id, 5).await.unwrap();
        assert_eq!(updated.quantity, 8);

        let updated = db.trading().add_quantity(&item.id, -20).await.unwrap();
        assert_eq!(updated.quantity, 0);

        let err = db.trading().add_quantity("missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_quantity_rejects_overflow() {
        let db = test_db().await;
        let item = seed_trading_item(&db, "205/55 R16", 5).await;

        let err = db.trading().add_quantity(&item.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::Overflow { .. }));

        let stored = db.trading().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
        assert_eq!(db.trading().list_all().await.unwrap().len(), 1);

        let full = db.trading().add_quantity(&item.id, i64::MAX - 5).await.unwrap();
        assert_eq!(full.quantity, i64::MAX);

        let emptied = db.trading().add_quantity(&item.id, i64::MIN).await.unwrap();
        assert_eq!(emptied.quantity, 0);
    }

    #[tokio::test]
    async fn test_search_on_size() {
        let db = test_db().await;
        seed_trading_item(&db, "205/55 R16", 4).await;
        seed_trading_item(&db, "225/45 R17", 4).await;

        let query = SearchQuery::from_params([("searchInput", "r17")]);
        let page = db.trading().search(&query).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].size, "225/45 R17");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = test_db().await;
        let item = seed_trading_item(&db, "205/55 R16", 4).await;

        let patch = TradingItemPatch {
            selling_price_cents: Some(8_900),
            ..Default::default()
        };
        let updated = db.trading().update(&item.id, &patch).await.unwrap();
        assert_eq!(updated.selling_price_cents, 8_900);
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.brand, item.brand);
    }
}
