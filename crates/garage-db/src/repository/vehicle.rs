//! # Vehicle Repository

use garage_core::query::{schema, Page, SearchQuery};
use garage_core::{Vehicle, VehiclePatch};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::listing::Table;

const VEHICLES: Table = Table {
    name: "vehicles",
    columns: "id, manufacturer, model, plate_number, client_id",
};

/// Repository for vehicles. Every vehicle belongs to an existing client.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: SqlitePool,
}

impl VehicleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VehicleRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<Vehicle>> {
        VEHICLES.all(&self.pool, None).await
    }

    /// Paginated search on model, optionally narrowed to one client.
    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<Vehicle>> {
        VEHICLES.search(&self.pool, &schema::VEHICLES, query).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Vehicle>> {
        VEHICLES.get(&self.pool, id).await
    }

    pub async fn insert(&self, vehicle: &Vehicle) -> DbResult<Vehicle> {
        debug!(id = %vehicle.id, client_id = %vehicle.client_id, "Inserting vehicle");

        sqlx::query(
            r#"
            INSERT INTO vehicles (id, manufacturer, model, plate_number, client_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&vehicle.id)
        .bind(&vehicle.manufacturer)
        .bind(&vehicle.model)
        .bind(&vehicle.plate_number)
        .bind(&vehicle.client_id)
        .execute(&self.pool)
        .await?;

        Ok(vehicle.clone())
    }

    pub async fn update(&self, id: &str, patch: &VehiclePatch) -> DbResult<Vehicle> {
        debug!(id = %id, "Updating vehicle");

        let plate = patch.plate_number.as_deref().map(|p| p.trim().to_uppercase());

        let result = sqlx::query(
            r#"
            UPDATE vehicles SET
                manufacturer = COALESCE(?2, manufacturer),
                model = COALESCE(?3, model),
                plate_number = COALESCE(?4, plate_number),
                client_id = COALESCE(?5, client_id)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.manufacturer)
        .bind(&patch.model)
        .bind(&plate)
        .bind(&patch.client_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vehicle", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Vehicle", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        VEHICLES.delete_many(&self.pool, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::test_support::{seed_client, test_db};
    use garage_core::NewVehicle;

    fn civic(client_id: &str) -> Vehicle {
        NewVehicle {
            manufacturer: "Honda".to_string(),
            model: "Civic".to_string(),
            plate_number: "zg 123-ab".to_string(),
            client_id: client_id.to_string(),
        }
        .into_vehicle(generate_id())
    }

    #[tokio::test]
    async fn test_search_by_client() {
        let db = test_db().await;
        let ana = seed_client(&db, "Ana", "ana@example.com").await;
        let ivo = seed_client(&db, "Ivo", "ivo@example.com").await;

        db.vehicles().insert(&civic(&ana.id)).await.unwrap();
        db.vehicles().insert(&civic(&ivo.id)).await.unwrap();

        let query = SearchQuery::from_params([("clientId", ana.id.as_str()), ("searchInput", "civ")]);
        let page = db.vehicles().search(&query).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].client_id, ana.id);
        assert_eq!(page.records[0].plate_number, "ZG 123-AB");
    }

    #[tokio::test]
    async fn test_unknown_client_is_rejected() {
        let db = test_db().await;
        let err = db.vehicles().insert(&civic("no-such-client")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_uppercases_plate() {
        let db = test_db().await;
        let ana = seed_client(&db, "Ana", "ana@example.com").await;
        let vehicle = db.vehicles().insert(&civic(&ana.id)).await.unwrap();

        let patch = VehiclePatch {
            plate_number: Some("ri 9-zz".to_string()),
            ..Default::default()
        };
        let updated = db.vehicles().update(&vehicle.id, &patch).await.unwrap();
        assert_eq!(updated.plate_number, "RI 9-ZZ");
        assert_eq!(updated.model, "Civic");
    }
}
