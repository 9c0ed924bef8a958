//! # Service Repository
//!
//! The catalogue of workshop services (oil change, alignment, ...).

use garage_core::query::{schema, Page, SearchQuery};
use garage_core::{Service, ServicePatch};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::listing::Table;

const SERVICES: Table = Table {
    name: "services",
    columns: "id, category, name, description, duration, frequency, price_cents",
};

#[derive(Debug, Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
}

impl ServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ServiceRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<Service>> {
        SERVICES.all(&self.pool, None).await
    }

    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<Service>> {
        SERVICES.search(&self.pool, &schema::SERVICES, query).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Service>> {
        SERVICES.get(&self.pool, id).await
    }

    pub async fn insert(&self, service: &Service) -> DbResult<Service> {
        debug!(id = %service.id, "Inserting service");

        sqlx::query(
            r#"
            INSERT INTO services (id, category, name, description, duration, frequency, price_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&service.id)
        .bind(&service.category)
        .bind(&service.name)
        .bind(&service.description)
        .bind(&service.duration)
        .bind(&service.frequency)
        .bind(service.price_cents)
        .execute(&self.pool)
        .await?;

        Ok(service.clone())
    }

    pub async fn update(&self, id: &str, patch: &ServicePatch) -> DbResult<Service> {
        debug!(id = %id, "Updating service");

        let result = sqlx::query(
            r#"
            UPDATE services SET
                category = COALESCE(?2, category),
                name = COALESCE(?3, name),
                description = COALESCE(?4, description),
                duration = COALESCE(?5, duration),
                frequency = COALESCE(?6, frequency),
                price_cents = COALESCE(?7, price_cents)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.category)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.duration)
        .bind(&patch.frequency)
        .bind(patch.price_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Service", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        SERVICES.delete_many(&self.pool, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::test_support::test_db;
    use garage_core::NewService;

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let db = test_db().await;
        let service = NewService {
            category: "Maintenance".to_string(),
            name: "Oil change".to_string(),
            description: "Drain, filter, refill".to_string(),
            duration: "45 min".to_string(),
            frequency: "12 months".to_string(),
            price_cents: 6_000,
        }
        .into_service(generate_id());
        db.services().insert(&service).await.unwrap();

        let patch = ServicePatch {
            price_cents: Some(6_500),
            ..Default::default()
        };
        let updated = db.services().update(&service.id, &patch).await.unwrap();
        assert_eq!(updated.price_cents, 6_500);
        assert_eq!(updated.duration, "45 min");

        assert_eq!(db.services().delete_many(&[service.id.clone()]).await.unwrap(), 1);
        assert!(db.services().get_by_id(&service.id).await.unwrap().is_none());
    }
}
