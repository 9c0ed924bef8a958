//! Loyalty discount routes, mounted at `/api/client/discounts`.
//!
//! Loyalty numbers are assigned by storage; a `loyaltyNumber` in the
//! create body is ignored.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use garage_core::query::Page;
use garage_core::{Discount, DiscountPatch, NewDiscount};
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

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Discount>>> {
    Ok(Json(state.db.discounts().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<Discount>>> {
    let query = search_query(params);
    Ok(Json(state.db.discounts().search(&query).await?))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Discount>> {
    state
        .db
        .discounts()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Discount", &id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewDiscount>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Discount>)> {
    let Json(input) = body?;
    input.validate()?;

    let discount = input.into_discount(generate_id(), Utc::now());
    let discount = state.db.discounts().insert(&discount).await?;

    info!(
        id = %discount.id,
        loyalty_number = discount.loyalty_number,
        "Discount issued"
    );
    Ok((StatusCode::CREATED, Json(discount)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<DiscountPatch>, JsonRejection>,
) -> ApiResult<Json<Discount>> {
    let Json(patch) = body?;
    patch.validate()?;
    Ok(Json(state.db.discounts().update(&id, &patch).await?))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.discounts().delete_many(&ids).await?;
    Ok(Json(Deleted::new(deleted, "discount")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.discounts().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Discount", &id));
    }
    Ok(Json(Deleted::new(deleted, "discount")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::clients;
    use crate::routes::test_support::test_state;
    use garage_core::NewClient;

    #[tokio::test]
    async fn test_loyalty_numbers_are_sequential() {
        let state = test_state().await;
        let (_, Json(client)) = clients::create(
            State(state.clone()),
            Ok(Json(NewClient {
                company: String::new(),
                name: "Loyal".to_string(),
                email: "loyal@example.com".to_string(),
                contact: String::new(),
                date_issued: None,
            })),
        )
        .await
        .unwrap();

        let mut numbers = Vec::new();
        for value in [500, 750, 1000] {
            let (_, Json(discount)) = create(
                State(state.clone()),
                Ok(Json(NewDiscount {
                    value_cents: value,
                    client_id: client.id.clone(),
                    date_issued: None,
                })),
            )
            .await
            .unwrap();
            numbers.push(discount.loyalty_number);
        }

        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
