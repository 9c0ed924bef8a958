//! # Discount Repository
//!
//! Loyalty discounts granted to clients.
//!
//! ## Loyalty Numbers
//! ```text
//! INSERT INTO discounts (..., loyalty_number, ...)
//! VALUES (..., (SELECT COALESCE(MAX(loyalty_number), 0) + 1 FROM discounts), ...)
//! RETURNING loyalty_number
//! ```
//! SQLite runs the whole statement under one write lock, so two concurrent
//! inserts cannot read the same maximum. The UNIQUE index rejects anything
//! that slips past.

use garage_core::query::{schema, Page, SearchQuery};
use garage_core::{Discount, DiscountPatch};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::listing::Table;

const DISCOUNTS: Table = Table {
    name: "discounts",
    columns: "id, loyalty_number, value_cents, client_id, date_issued",
};

#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<Discount>> {
        DISCOUNTS.all(&self.pool, None).await
    }

    /// Paginated search on the loyalty number's digits, optionally by client.
    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<Discount>> {
        DISCOUNTS.search(&self.pool, &schema::DISCOUNTS, query).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Discount>> {
        DISCOUNTS.get(&self.pool, id).await
    }

    /// Inserts the discount and returns it with its assigned loyalty number.
    pub async fn insert(&self, discount: &Discount) -> DbResult<Discount> {
        debug!(id = %discount.id, client_id = %discount.client_id, "Inserting discount");

        let loyalty_number: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO discounts (id, loyalty_number, value_cents, client_id, date_issued)
            VALUES (
                ?1,
                (SELECT COALESCE(MAX(loyalty_number), 0) + 1 FROM discounts),
                ?2, ?3, ?4
            )
            RETURNING loyalty_number
            "#,
        )
        .bind(&discount.id)
        .bind(discount.value_cents)
        .bind(&discount.client_id)
        .bind(discount.date_issued)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = %discount.id, loyalty_number = loyalty_number, "Loyalty number assigned");

        Ok(Discount {
            loyalty_number,
            ..discount.clone()
        })
    }

    pub async fn update(&self, id: &str, patch: &DiscountPatch) -> DbResult<Discount> {
        debug!(id = %id, "Updating discount");

        let result = sqlx::query(
            r#"
            UPDATE discounts SET
                value_cents = COALESCE(?2, value_cents),
                client_id = COALESCE(?3, client_id),
                date_issued = COALESCE(?4, date_issued)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(patch.value_cents)
        .bind(&patch.client_id)
        .bind(patch.date_issued)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        DISCOUNTS.delete_many(&self.pool, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::test_support::{seed_client, test_db};
    use chrono::Utc;
    use garage_core::NewDiscount;

    fn discount(client_id: &str, value_cents: i64) -> Discount {
        NewDiscount {
            value_cents,
            client_id: client_id.to_string(),
            date_issued: None,
        }
        .into_discount(generate_id(), Utc::now())
    }

    #[tokio::test]
    async fn test_loyalty_numbers_are_sequential() {
        let db = test_db().await;
        let ana = seed_client(&db, "Ana", "ana@example.com").await;

        let first = db.discounts().insert(&discount(&ana.id, 500)).await.unwrap();
        let second = db.discounts().insert(&discount(&ana.id, 700)).await.unwrap();
        let third = db.discounts().insert(&discount(&ana.id, 900)).await.unwrap();

        assert_eq!(first.loyalty_number, 1);
        assert_eq!(second.loyalty_number, 2);
        assert_eq!(third.loyalty_number, 3);

        // numbering continues from the maximum, not the row count
        db.discounts().delete_many(&[second.id]).await.unwrap();
        let fourth = db.discounts().insert(&discount(&ana.id, 100)).await.unwrap();
        assert_eq!(fourth.loyalty_number, 4);
    }

    #[tokio::test]
    async fn test_search_on_loyalty_number() {
        let db = test_db().await;
        let ana = seed_client(&db, "Ana", "ana@example.com").await;
        for _ in 0..12 {
            db.discounts().insert(&discount(&ana.id, 100)).await.unwrap();
        }

        // matches 1, 10, 11, 12
        let query = SearchQuery::from_params([("searchInput", "1")]);
        let page = db.discounts().search(&query).await.unwrap();
        assert_eq!(page.pagination.unwrap().total_items, 4);
    }

    #[tokio::test]
    async fn test_filter_by_client() {
        let db = test_db().await;
        let ana = seed_client(&db, "Ana", "ana@example.com").await;
        let ivo = seed_client(&db, "Ivo", "ivo@example.com").await;
        db.discounts().insert(&discount(&ana.id, 100)).await.unwrap();
        db.discounts().insert(&discount(&ivo.id, 200)).await.unwrap();

        let query = SearchQuery::from_params([("clientId", ivo.id.as_str())]);
        let page = db.discounts().search(&query).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].value_cents, 200);
    }
}
