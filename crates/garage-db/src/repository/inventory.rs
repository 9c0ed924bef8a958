//! # Inventory Repository
//!
//! Workshop consumables and parts. Quantities are free-form text
//! ("3 boxes", "12 L"), so there is no stock arithmetic here.

use garage_core::query::{schema, Page, SearchQuery};
use garage_core::{InventoryItem, InventoryItemPatch};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::listing::Table;

const INVENTORY_ITEMS: Table = Table {
    name: "inventory_items",
    columns: "id, brand, name, description, category, size, quantity, unit, \
              date_issued, cost_price_cents, selling_price_cents",
};

#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<InventoryItem>> {
        INVENTORY_ITEMS.all(&self.pool, None).await
    }

    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<InventoryItem>> {
        INVENTORY_ITEMS
            .search(&self.pool, &schema::INVENTORY_ITEMS, query)
            .await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        INVENTORY_ITEMS.get(&self.pool, id).await
    }

    pub async fn insert(&self, item: &InventoryItem) -> DbResult<InventoryItem> {
        debug!(id = %item.id, "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, brand, name, description, category, size, quantity, unit,
                date_issued, cost_price_cents, selling_price_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.brand)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category)
        .bind(&item.size)
        .bind(&item.quantity)
        .bind(&item.unit)
        .bind(item.date_issued)
        .bind(item.cost_price_cents)
        .bind(item.selling_price_cents)
        .execute(&self.pool)
        .await?;

        Ok(item.clone())
    }

    pub async fn update(&self, id: &str, patch: &InventoryItemPatch) -> DbResult<InventoryItem> {
        debug!(id = %id, "Updating inventory item");

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                brand = COALESCE(?2, brand),
                name = COALESCE(?3, name),
                description = COALESCE(?4, description),
                category = COALESCE(?5, category),
                size = COALESCE(?6, size),
                quantity = COALESCE(?7, quantity),
                unit = COALESCE(?8, unit),
                date_issued = COALESCE(?9, date_issued),
                cost_price_cents = COALESCE(?10, cost_price_cents),
                selling_price_cents = COALESCE(?11, selling_price_cents)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.brand)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.category)
        .bind(&patch.size)
        .bind(&patch.quantity)
        .bind(&patch.unit)
        .bind(patch.date_issued)
        .bind(patch.cost_price_cents)
        .bind(patch.selling_price_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory item", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory item", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        INVENTORY_ITEMS.delete_many(&self.pool, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::test_support::test_db;
    use chrono::Utc;
    use garage_core::NewInventoryItem;

    fn oil(name: &str) -> InventoryItem {
        NewInventoryItem {
            brand: "Castrol".to_string(),
            name: name.to_string(),
            description: None,
            category: "Oil".to_string(),
            size: "5L".to_string(),
            quantity: "3 cans".to_string(),
            unit: "can".to_string(),
            date_issued: None,
            cost_price_cents: 2_500,
            selling_price_cents: 4_200,
        }
        .into_inventory_item(generate_id(), Utc::now())
    }

    #[tokio::test]
    async fn test_insert_search_update() {
        let db = test_db().await;
        let edge = db.inventory().insert(&oil("Edge 5W-30")).await.unwrap();
        db.inventory().insert(&oil("Magnatec 10W-40")).await.unwrap();

        let page = db
            .inventory()
            .search(&SearchQuery::from_params([("searchInput", "edge")]))
            .await
            .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, edge.id);

        let patch = InventoryItemPatch {
            quantity: Some("1 can".to_string()),
            ..Default::default()
        };
        let updated = db.inventory().update(&edge.id, &patch).await.unwrap();
        assert_eq!(updated.quantity, "1 can");
        assert_eq!(updated.selling_price_cents, 4_200);
    }
}
