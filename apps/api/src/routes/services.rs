//! Workshop service routes, mounted at `/api/services`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use garage_core::query::Page;
use garage_core::{NewService, Service, ServicePatch};
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

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Service>>> {
    Ok(Json(state.db.services().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<Service>>> {
    let query = search_query(params);
    Ok(Json(state.db.services().search(&query).await?))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Service>> {
    state
        .db
        .services()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Service", &id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewService>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    let Json(input) = body?;
    input.validate()?;

    let service = state
        .db
        .services()
        .insert(&input.into_service(generate_id()))
        .await?;

    info!(id = %service.id, name = %service.name, "Service created");
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ServicePatch>, JsonRejection>,
) -> ApiResult<Json<Service>> {
    let Json(patch) = body?;
    patch.validate()?;
    Ok(Json(state.db.services().update(&id, &patch).await?))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.services().delete_many(&ids).await?;
    Ok(Json(Deleted::new(deleted, "service")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.services().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Service", &id));
    }
    Ok(Json(Deleted::new(deleted, "service")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{params, test_state};

    fn service(name: &str) -> NewService {
        NewService {
            category: "Tyres".to_string(),
            name: name.to_string(),
            description: String::new(),
            duration: "30 min".to_string(),
            frequency: String::new(),
            price_cents: 2_500,
        }
    }

    #[tokio::test]
    async fn test_paginate_pages_of_ten() {
        let state = test_state().await;
        for n in 0..12 {
            create(State(state.clone()), Ok(Json(service(&format!("Service {n}")))))
                .await
                .unwrap();
        }

        let Json(page) = paginate(State(state), Query(params(&[("pageNumber", "2")])))
            .await
            .unwrap();

        assert_eq!(page.records.len(), 2);
        let meta = page.pagination.unwrap();
        assert_eq!(meta.total_items, 12);
        assert_eq!(meta.total_pages, 2);
        assert_eq!(page.records[0].name, "Service 10");
    }
}
