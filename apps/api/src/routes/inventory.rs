//! Inventory item routes, mounted at `/api/inventory`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use garage_core::query::Page;
use garage_core::{InventoryItem, InventoryItemPatch, NewInventoryItem};
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

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<InventoryItem>>> {
    Ok(Json(state.db.inventory().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<InventoryItem>>> {
    let query = search_query(params);
    Ok(Json(state.db.inventory().search(&query).await?))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryItem>> {
    state
        .db
        .inventory()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Inventory item", &id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewInventoryItem>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let Json(input) = body?;
    input.validate()?;

    let item = input.into_inventory_item(generate_id(), Utc::now());
    let item = state.db.inventory().insert(&item).await?;

    info!(id = %item.id, "Inventory item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<InventoryItemPatch>, JsonRejection>,
) -> ApiResult<Json<InventoryItem>> {
    let Json(patch) = body?;
    patch.validate()?;
    Ok(Json(state.db.inventory().update(&id, &patch).await?))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.inventory().delete_many(&ids).await?;
    Ok(Json(Deleted::new(deleted, "inventory item")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.inventory().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Inventory item", &id));
    }
    Ok(Json(Deleted::new(deleted, "inventory item")))
}
