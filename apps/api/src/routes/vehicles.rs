//! Vehicle routes, mounted at `/api/client/vehicles`.
//!
//! `GET /paginate?clientId=...` narrows the listing to one client's vehicles.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use garage_core::query::Page;
use garage_core::{NewVehicle, Vehicle, VehiclePatch};
use garage_db::repository::generate_id;
use serde_json::Value;
use tracing::info;

use super::{delete_ids, search_query, Deleted, QueryParams};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_all).post(create).delete(delete_many))
        .route("/paginate", get(paginate))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
}

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.db.vehicles().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<Vehicle>>> {
    let query = search_query(params);
    Ok(Json(state.db.vehicles().search(&query).await?))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vehicle>> {
    state
        .db
        .vehicles()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Vehicle", &id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewVehicle>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    let Json(input) = body?;
    input.validate()?;

    let vehicle = state
        .db
        .vehicles()
        .insert(&input.into_vehicle(generate_id()))
        .await?;

    info!(id = %vehicle.id, client_id = %vehicle.client_id, "Vehicle created");
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<VehiclePatch>, JsonRejection>,
) -> ApiResult<Json<Vehicle>> {
    let Json(patch) = body?;
    patch.validate()?;
    Ok(Json(state.db.vehicles().update(&id, &patch).await?))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.vehicles().delete_many(&ids).await?;
    Ok(Json(Deleted::new(deleted, "vehicle")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.vehicles().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Vehicle", &id));
    }
    Ok(Json(Deleted::new(deleted, "vehicle")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::routes::clients;
    use crate::routes::test_support::{params, test_state};
    use garage_core::NewClient;

    async fn client_id(state: &Arc<AppState>, email: &str) -> String {
        let (_, Json(client)) = clients::create(
            State(state.clone()),
            Ok(Json(NewClient {
                company: String::new(),
                name: "Owner".to_string(),
                email: email.to_string(),
                contact: String::new(),
                date_issued: None,
            })),
        )
        .await
        .unwrap();
        client.id
    }

    fn new_vehicle(model: &str, client_id: &str) -> NewVehicle {
        NewVehicle {
            manufacturer: "Toyota".to_string(),
            model: model.to_string(),
            plate_number: "abc-123".to_string(),
            client_id: client_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_client_is_rejected() {
        let state = test_state().await;
        let err = create(State(state), Ok(Json(new_vehicle("Corolla", "ghost"))))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_paginate_by_client() {
        let state = test_state().await;
        let first = client_id(&state, "one@example.com").await;
        let second = client_id(&state, "two@example.com").await;

        for (model, owner) in [("Corolla", &first), ("Yaris", &first), ("Civic", &second)] {
            create(State(state.clone()), Ok(Json(new_vehicle(model, owner))))
                .await
                .unwrap();
        }

        let Json(page) = paginate(State(state), Query(params(&[("clientId", &first)])))
            .await
            .unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.records.iter().all(|v| v.client_id == first));
        assert_eq!(page.records[0].plate_number, "ABC-123");
    }
}
