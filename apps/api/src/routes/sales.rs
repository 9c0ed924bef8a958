//! # Sale Routes
//!
//! Mounted at `/api/sales`. Read endpoints return populated sales (client
//! and cart items expanded).
//!
//! ## Report Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /api/sales/report?week=2&month=2&year=2024&branch=North           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SearchQuery::from_params        raw strings, nothing interpreted yet  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportPlan::build(SALES_REPORT) ── bad dates ──► 400 INVALID_QUERY    │
//! │       │   branch = North                                                │
//! │       │   date_issued ∈ [2024-02-08, 2024-02-15)                        │
//! │       ▼                                                                 │
//! │  SaleRepository::report          newest first, unpaginated             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { records: [PopulatedSale, ...] }                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use garage_core::query::{schema, Page, ReportPlan};
use garage_core::{NewSale, PopulatedSale, Sale, SaleFlags, SalePatch};
use garage_db::repository::generate_id;
use serde_json::Value;
use tracing::{debug, info};

use super::{delete_ids, search_query, Deleted, QueryParams};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_all).post(create).delete(delete_many))
        .route("/paginate", get(paginate))
        .route("/report", get(report))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
        .route("/{id}/paid-recurring", patch(set_paid_recurring))
}

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<PopulatedSale>>> {
    Ok(Json(state.db.sales().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<PopulatedSale>>> {
    let query = search_query(params);
    Ok(Json(state.db.sales().search(&query).await?))
}

pub async fn report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<PopulatedSale>>> {
    let query = search_query(params);
    let plan = ReportPlan::build(&schema::SALES_REPORT, &query)?;
    debug!(clauses = plan.filter.len(), "Report plan built");

    let records = state.db.sales().report(&plan).await?;
    Ok(Json(Page::unpaginated(records)))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PopulatedSale>> {
    state
        .db
        .sales()
        .get_populated(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewSale>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let Json(input) = body?;
    input.validate()?;

    let sale = input.into_sale(generate_id(), Utc::now());
    let sale = state.db.sales().insert(&sale).await?;

    info!(
        id = %sale.id,
        transaction_number = sale.transaction_number,
        total_cents = sale.total_price_cents,
        "Sale recorded"
    );
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SalePatch>, JsonRejection>,
) -> ApiResult<Json<PopulatedSale>> {
    let Json(patch) = body?;
    patch.validate()?;
    Ok(Json(state.db.sales().update(&id, &patch).await?))
}

/// Toggles `paid` and/or `recurring`.
pub async fn set_paid_recurring(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SaleFlags>, JsonRejection>,
) -> ApiResult<Json<PopulatedSale>> {
    let Json(flags) = body?;
    if flags.is_empty() {
        return Err(ApiError::validation("paid or recurring is required"));
    }
    Ok(Json(state.db.sales().set_flags(&id, flags).await?))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.sales().delete_many(&ids).await?;
    info!(deleted = deleted, "Sales deleted");
    Ok(Json(Deleted::new(deleted, "sale")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.sales().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Sale", &id));
    }
    Ok(Json(Deleted::new(deleted, "sale")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::routes::test_support::{params, test_state};
    use crate::routes::{clients, trading};
    use chrono::{DateTime, TimeZone};
    use garage_core::{CartLine, NewClient, NewTradingItem};

    struct Fixture {
        state: Arc<AppState>,
        client_id: String,
        item_id: String,
    }

    async fn fixture() -> Fixture {
        let state = test_state().await;
        let (_, Json(client)) = clients::create(
            State(state.clone()),
            Ok(Json(NewClient {
                company: String::new(),
                name: "Fleet Owner".to_string(),
                email: "fleet@example.com".to_string(),
                contact: String::new(),
                date_issued: None,
            })),
        )
        .await
        .unwrap();
        let (_, Json(item)) = trading::create(
            State(state.clone()),
            Ok(Json(NewTradingItem {
                category: "Tyres".to_string(),
                size: "205/55R16".to_string(),
                brand: "Pirelli".to_string(),
                description: None,
                quantity: 40,
                unit: "pcs".to_string(),
                selling_price_cents: 8_000,
            })),
        )
        .await
        .unwrap();
        Fixture {
            state,
            client_id: client.id,
            item_id: item.id,
        }
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn sale(f: &Fixture, branch: &str, issued: DateTime<Utc>, paid: bool) -> NewSale {
        NewSale {
            transaction_number: None,
            branch: branch.to_string(),
            client_id: f.client_id.clone(),
            cart: vec![CartLine {
                item_id: f.item_id.clone(),
                item_price_cents: 8_000,
                quantity: 2,
                sub_total_cents: 16_000,
            }],
            discount_cents: 1_000,
            total_price_cents: None,
            paid,
            date_issued: Some(issued),
            recurring: false,
        }
    }

    async fn record(f: &Fixture, input: NewSale) -> Sale {
        let (_, Json(sale)) = create(State(f.state.clone()), Ok(Json(input)))
            .await
            .unwrap();
        sale
    }

    #[tokio::test]
    async fn test_create_assigns_number_and_total() {
        let f = fixture().await;
        let first = record(&f, sale(&f, "North", at(2024, 2, 1), false)).await;
        let second = record(&f, sale(&f, "North", at(2024, 2, 2), false)).await;

        assert_eq!(first.transaction_number, 1);
        assert_eq!(second.transaction_number, 2);
        assert_eq!(first.total_price_cents, 15_000);
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_subtotals() {
        let f = fixture().await;
        let mut input = sale(&f, "North", at(2024, 2, 1), false);
        let line = CartLine {
            item_id: f.item_id.clone(),
            item_price_cents: 8_000,
            quantity: 1,
            sub_total_cents: i64::MAX,
        };
        input.cart = vec![line.clone(), line];

        let err = create(State(f.state.clone()), Ok(Json(input)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_one_is_populated() {
        let f = fixture().await;
        let created = record(&f, sale(&f, "North", at(2024, 2, 1), false)).await;

        let Json(populated) = get_one(State(f.state.clone()), Path(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(populated.sale.cart.len(), 1);
        assert_eq!(populated.client.map(|c| c.id), Some(f.client_id.clone()));
        assert_eq!(populated.items.len(), 1);
        assert_eq!(populated.items[0].id, f.item_id);
    }

    #[tokio::test]
    async fn test_report_week_of_month() {
        let f = fixture().await;
        record(&f, sale(&f, "North", at(2024, 2, 7), true)).await;
        let in_week = record(&f, sale(&f, "North", at(2024, 2, 8), true)).await;
        let also_in_week = record(&f, sale(&f, "North", at(2024, 2, 14), false)).await;
        record(&f, sale(&f, "North", at(2024, 2, 15), true)).await;

        let Json(page) = report(
            State(f.state.clone()),
            Query(params(&[("week", "2"), ("month", "2"), ("year", "2024")])),
        )
        .await
        .unwrap();

        assert!(page.pagination.is_none());
        let ids: Vec<_> = page.records.iter().map(|s| s.sale.id.clone()).collect();
        assert_eq!(ids, vec![also_in_week.id, in_week.id]);
    }

    #[tokio::test]
    async fn test_report_combines_date_and_flags() {
        let f = fixture().await;
        let paid = record(&f, sale(&f, "North", at(2024, 3, 5), true)).await;
        record(&f, sale(&f, "North", at(2024, 3, 6), false)).await;
        record(&f, sale(&f, "South", at(2024, 3, 7), true)).await;

        let Json(page) = report(
            State(f.state.clone()),
            Query(params(&[
                ("month", "3"),
                ("year", "2024"),
                ("branch", "North"),
                ("paid", "true"),
            ])),
        )
        .await
        .unwrap();

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].sale.id, paid.id);
    }

    #[tokio::test]
    async fn test_report_rejects_day_without_month() {
        let f = fixture().await;
        let err = report(
            State(f.state.clone()),
            Query(params(&[("day", "3"), ("year", "2024")])),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuery);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_paginate_newest_first_with_paid_flag() {
        let f = fixture().await;
        record(&f, sale(&f, "North", at(2024, 1, 1), true)).await;
        let newest_unpaid = record(&f, sale(&f, "North", at(2024, 1, 3), false)).await;
        let older_unpaid = record(&f, sale(&f, "North", at(2024, 1, 2), false)).await;

        let Json(page) = paginate(State(f.state.clone()), Query(params(&[("paid", "false")])))
            .await
            .unwrap();

        let ids: Vec<_> = page.records.iter().map(|s| s.sale.id.clone()).collect();
        assert_eq!(ids, vec![newest_unpaid.id, older_unpaid.id]);
        assert_eq!(page.pagination.unwrap().total_items, 2);
    }

    #[tokio::test]
    async fn test_set_paid_recurring() {
        let f = fixture().await;
        let created = record(&f, sale(&f, "North", at(2024, 2, 1), false)).await;

        let Json(updated) = set_paid_recurring(
            State(f.state.clone()),
            Path(created.id.clone()),
            Ok(Json(SaleFlags {
                paid: Some(true),
                recurring: None,
            })),
        )
        .await
        .unwrap();
        assert!(updated.sale.paid);
        assert!(!updated.sale.recurring);

        let err = set_paid_recurring(
            State(f.state.clone()),
            Path(created.id),
            Ok(Json(SaleFlags::default())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
