//! # Trading Item Routes
//!
//! Mounted at `/api/tradings`. Besides the common CRUD set:
//!
//! ```text
//!   GET   /api/tradings/low-stock               quantity < LOW_STOCK_THRESHOLD
//!   PATCH /api/tradings/{id}/add-quantity       {quantityToAdd: -3}
//!                                                 → quantity = max(q + delta, 0)
//! ```

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use garage_core::query::Page;
use garage_core::{NewTradingItem, QuantityAdjustment, TradingItem, TradingItemPatch};
use garage_db::repository::generate_id;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{delete_ids, search_query, Deleted, QueryParams};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_all).post(create).delete(delete_many))
        .route("/paginate", get(paginate))
        .route("/low-stock", get(low_stock))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
        .route("/{id}/add-quantity", patch(add_quantity))
}

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TradingItem>>> {
    Ok(Json(state.db.trading().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<TradingItem>>> {
    let query = search_query(params);
    Ok(Json(state.db.trading().search(&query).await?))
}

pub async fn low_stock(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TradingItem>>> {
    let items = state.db.trading().low_stock().await?;
    debug!(count = items.len(), "Low stock items");
    Ok(Json(items))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TradingItem>> {
    state
        .db
        .trading()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Trading item", &id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewTradingItem>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TradingItem>)> {
    let Json(input) = body?;
    input.validate()?;

    let item = state
        .db
        .trading()
        .insert(&input.into_trading_item(generate_id()))
        .await?;

    info!(id = %item.id, size = %item.size, "Trading item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<TradingItemPatch>, JsonRejection>,
) -> ApiResult<Json<TradingItem>> {
    let Json(patch) = body?;
    patch.validate()?;
    Ok(Json(state.db.trading().update(&id, &patch).await?))
}

pub async fn add_quantity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<QuantityAdjustment>, JsonRejection>,
) -> ApiResult<Json<TradingItem>> {
    let Json(adjustment) = body?;
    let item = state
        .db
        .trading()
        .add_quantity(&id, adjustment.quantity_to_add)
        .await?;

    info!(id = %id, delta = adjustment.quantity_to_add, quantity = item.quantity, "Stock adjusted");
    if item.is_low_stock() {
        warn!(id = %id, size = %item.size, quantity = item.quantity, "Item is low on stock");
    }
    Ok(Json(item))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.trading().delete_many(&ids).await?;
    Ok(Json(Deleted::new(deleted, "trading item")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.trading().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Trading item", &id));
    }
    Ok(Json(Deleted::new(deleted, "trading item")))
}
