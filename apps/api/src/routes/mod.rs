//! HTTP routes, one module per entity.
//!
//! Every entity router exposes the same shape:
//!
//! ```text
//!   GET    /            all records
//!   GET    /paginate    ?pageNumber=&searchInput=&...  → {records, pagination}
//!   GET    /{id}        one record or 404
//!   POST   /            create (201)
//!   PUT    /{id}        partial update
//!   DELETE /            body {ids: [...]}
//!   DELETE /{id}        single delete
//! ```

pub mod clients;
pub mod discounts;
pub mod health;
pub mod inventory;
pub mod sales;
pub mod services;
pub mod trading;
pub mod users;
pub mod vehicles;

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use garage_core::query::SearchQuery;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Raw query string parameters as received.
pub type QueryParams = HashMap<String, String>;

pub(crate) fn search_query(params: QueryParams) -> SearchQuery {
    SearchQuery::from_params(params)
}

/// Response of the delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub deleted: u64,
    pub message: String,
}

impl Deleted {
    pub fn new(deleted: u64, entity: &str) -> Self {
        Deleted {
            deleted,
            message: format!("{} {}(s) deleted", deleted, entity),
        }
    }
}

/// Extracts the `ids` array of a bulk delete body.
///
/// The body is taken as raw JSON so that a wrong `ids` shape reports the
/// same message regardless of what was sent.
pub(crate) fn delete_ids(body: Result<Json<Value>, JsonRejection>) -> Result<Vec<String>, ApiError> {
    let Json(body) = body?;
    let not_array = || ApiError::invalid_query("ids must be an array");

    body.get("ids")
        .and_then(Value::as_array)
        .ok_or_else(not_array)?
        .iter()
        .map(|id| id.as_str().map(str::to_string).ok_or_else(not_array))
        .collect()
}
