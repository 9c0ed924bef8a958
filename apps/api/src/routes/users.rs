//! # User Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/users/register                                              │
//! │       validate ─► username taken? ─► argon2 hash ─► insert ─► 201      │
//! │                        │                                                │
//! │                        └─► 400 "username already exists"               │
//! │                                                                         │
//! │  POST /api/users/authenticate                                          │
//! │       lookup by username ─► verify hash ─► {id, name, accountType,     │
//! │            │                    │            access}                    │
//! │            └──── miss ──────────┴──► 401 "invalid username or password"│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Password hashes are never serialized.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use garage_core::query::Page;
use garage_core::{AuthenticatedUser, Credentials, NewUser, User, UserPatch};
use garage_db::repository::generate_id;
use serde_json::Value;
use tracing::{info, warn};

use super::{delete_ids, search_query, Deleted, QueryParams};
use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const BAD_CREDENTIALS: &str = "invalid username or password";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_all).delete(delete_many))
        .route("/paginate", get(paginate))
        .route("/register", post(register))
        .route("/authenticate", post(authenticate))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
}

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db.users().list_all().await?))
}

pub async fn paginate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<User>>> {
    let query = search_query(params);
    Ok(Json(state.db.users().search(&query).await?))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User", &id))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(input) = body?;
    input.validate()?;

    let users = state.db.users();
    if users.get_by_username(input.username.trim()).await?.is_some() {
        return Err(ApiError::validation("username already exists"));
    }

    let password_hash = hash_password(input.password.clone()).await?;
    let user = users
        .insert(&input.into_user(generate_id(), password_hash))
        .await?;

    info!(id = %user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<AuthenticatedUser>> {
    let Json(credentials) = body?;

    let Some(user) = state.db.users().get_by_username(credentials.username.trim()).await? else {
        warn!("Login attempt for unknown user");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(credentials.password, user.password_hash.clone()).await? {
        warn!(id = %user.id, "Login attempt with wrong password");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    info!(id = %user.id, "User authenticated");
    Ok(Json(AuthenticatedUser::from(user)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(patch) = body?;
    patch.validate()?;

    let password_hash = match patch.password.clone() {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    let user = state
        .db
        .users()
        .update(&id, &patch, password_hash.as_deref())
        .await?;
    Ok(Json(user))
}

pub async fn delete_many(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Deleted>> {
    let ids = delete_ids(body)?;
    let deleted = state.db.users().delete_many(&ids).await?;
    Ok(Json(Deleted::new(deleted, "user")))
}

pub async fn delete_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Deleted>> {
    let deleted = state.db.users().delete_many(std::slice::from_ref(&id)).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("User", &id));
    }
    Ok(Json(Deleted::new(deleted, "user")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::routes::test_support::test_state;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "s3cret-pass".to_string(),
            name: "Front Desk".to_string(),
            account_type: "admin".to_string(),
            access: vec!["sales".to_string(), "clients".to_string()],
        }
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let state = test_state().await;
        let (code, Json(user)) = register(State(state.clone()), Ok(Json(new_user("desk"))))
            .await
            .unwrap();
        assert_eq!(code, StatusCode::CREATED);
        assert!(user.password_hash.starts_with("$argon2"));

        let body = serde_json::to_value(&user).unwrap();
        assert!(body.get("passwordHash").is_none());

        let Json(auth) = authenticate(State(state), Ok(Json(credentials("desk", "s3cret-pass"))))
            .await
            .unwrap();
        assert_eq!(auth.id, user.id);
        assert_eq!(auth.account_type, "admin");
        assert_eq!(auth.access, vec!["sales".to_string(), "clients".to_string()]);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let state = test_state().await;
        register(State(state.clone()), Ok(Json(new_user("desk"))))
            .await
            .unwrap();

        let unknown = authenticate(State(state.clone()), Ok(Json(credentials("nobody", "x"))))
            .await
            .unwrap_err();
        let wrong = authenticate(State(state), Ok(Json(credentials("desk", "wrong-pass"))))
            .await
            .unwrap_err();

        assert_eq!(unknown.code, ErrorCode::Unauthorized);
        assert_eq!(unknown.message, wrong.message);
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let state = test_state().await;
        register(State(state.clone()), Ok(Json(new_user("desk"))))
            .await
            .unwrap();
        let err = register(State(state), Ok(Json(new_user("desk"))))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "username already exists");
    }

    #[tokio::test]
    async fn test_password_change_rehashes() {
        let state = test_state().await;
        let (_, Json(user)) = register(State(state.clone()), Ok(Json(new_user("desk"))))
            .await
            .unwrap();

        let patch = UserPatch {
            password: Some("n3w-password".to_string()),
            ..UserPatch::default()
        };
        update(State(state.clone()), Path(user.id.clone()), Ok(Json(patch)))
            .await
            .unwrap();

        assert!(authenticate(State(state.clone()), Ok(Json(credentials("desk", "s3cret-pass"))))
            .await
            .is_err());
        assert!(authenticate(State(state), Ok(Json(credentials("desk", "n3w-password"))))
            .await
            .is_ok());
    }
}
