//! # Client Routes
//!
//! ```text
//!   GET    /api/clients                 all clients
//!   GET    /api/clients/paginate        ?pageNumber=2&searchInput=ana
//!   GET    /api/clients/{id}
//!   POST   /api/clients                 NewClient → 201
//!   PUT    /api/clients/{id}            ClientPatch
//!   DELETE /api/clients                 {ids: [...]}
//!   DELETE /api/clients/{id}
//! ```
//!
//! Deleting a client that still has vehicles, discounts or sales is
//! rejected as an invalid reference.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use garage_core::query::Page;
use garage_core::{Client, ClientPatch, NewClient};
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

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(state.db.clients().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<Client>>> {
    let query = search_query(params);
    Ok(Json(state.db.clients().search(&query).await?))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    state
        .db
        .clients()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Client", &id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewClient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let Json(input) = body?;
    input.validate()?;

    let client = input.into_client(generate_id(), Utc::now());
    let client = state.db.clients().insert(&client).await?;

    info!(id = %client.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ClientPatch>, JsonRejection>,
) -> ApiResult<Json<Client>> {
    let Json(patch) = body?;
    patch.validate()?;
    Ok(Json(state.db.clients().update(&id, &patch).await?))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.clients().delete_many(&ids).await?;
    info!(requested = ids.len(), deleted = deleted, "Clients deleted");
    Ok(Json(Deleted::new(deleted, "client")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.clients().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Client", &id));
    }
    Ok(Json(Deleted::new(deleted, "client")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::routes::test_support::{params, test_state};
    use serde_json::json;

    fn new_client(name: &str, email: &str) -> NewClient {
        NewClient {
            company: String::new(),
            name: name.to_string(),
            email: email.to_string(),
            contact: "555-0100".to_string(),
            date_issued: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let state = test_state().await;

        let (code, Json(created)) = create(
            State(state.clone()),
            Ok(Json(new_client("Ana Costa", "ana@example.com"))),
        )
        .await
        .unwrap();
        assert_eq!(code, StatusCode::CREATED);

        let Json(fetched) = get_one(State(state), Path(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let state = test_state().await;
        let err = get_one(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let state = test_state().await;
        let err = create(State(state), Ok(Json(new_client("Ana", "not-an-email"))))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_validation_error() {
        let state = test_state().await;
        create(State(state.clone()), Ok(Json(new_client("A", "dup@example.com"))))
            .await
            .unwrap();
        let err = create(State(state), Ok(Json(new_client("B", "dup@example.com"))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("already exists"));
    }

    #[tokio::test]
    async fn test_paginate_filters_by_search_input() {
        let state = test_state().await;
        for (name, email) in [
            ("Ana Costa", "ana@example.com"),
            ("Ben Adams", "ben@example.com"),
            ("Hana Bauer", "hana@example.com"),
        ] {
            create(State(state.clone()), Ok(Json(new_client(name, email))))
                .await
                .unwrap();
        }

        let Json(page) = paginate(
            State(state),
            Query(params(&[("searchInput", "ANA"), ("pageNumber", "1")])),
        )
        .await
        .unwrap();

        assert_eq!(page.records.len(), 2);
        let meta = page.pagination.unwrap();
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.total_items, 2);
    }

    #[tokio::test]
    async fn test_delete_many_and_bad_body() {
        let state = test_state().await;
        let (_, Json(a)) = create(State(state.clone()), Ok(Json(new_client("A", "a@example.com"))))
            .await
            .unwrap();
        let (_, Json(b)) = create(State(state.clone()), Ok(Json(new_client("B", "b@example.com"))))
            .await
            .unwrap();

        let Json(deleted) = delete_many(
            State(state.clone()),
            Ok(Json(json!({"ids": [a.id, b.id, "ghost"]}))),
        )
        .await
        .unwrap();
        assert_eq!(deleted, Deleted::new(2, "client"));

        let err = delete_many(State(state), Ok(Json(json!({"ids": "a"}))))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuery);
        assert_eq!(err.message, "ids must be an array");
    }

    #[tokio::test]
    async fn test_delete_one_missing() {
        let state = test_state().await;
        let err = delete_one(State(state), Path("ghost".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
