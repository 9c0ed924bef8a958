//! # User Repository
//!
//! Back-office accounts. This layer stores and returns password hashes but
//! never sees a plaintext password; hashing happens in the API layer.

use garage_core::query::{schema, Page, SearchQuery};
use garage_core::{User, UserPatch};
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::debug;

use super::with_duplicate_value;
use crate::error::{DbError, DbResult};
use crate::listing::Table;

const USERS: Table = Table {
    name: "users",
    columns: "id, username, password_hash, name, account_type, access",
};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<User>> {
        USERS.all(&self.pool, None).await
    }

    /// Paginated search on display name, five per page.
    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<User>> {
        USERS.search(&self.pool, &schema::USERS, query).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        USERS.get(&self.pool, id).await
    }

    /// Exact, case-sensitive lookup used for login.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, name, account_type, access
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn insert(&self, user: &User) -> DbResult<User> {
        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, name, account_type, access)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.account_type)
        .bind(Json(&user.access))
        .execute(&self.pool)
        .await
        .map_err(|e| with_duplicate_value(e.into(), &user.username))?;

        Ok(user.clone())
    }

    /// Applies the patch. `password_hash` replaces the stored hash when the
    /// patch carried a new password.
    pub async fn update(
        &self,
        id: &str,
        patch: &UserPatch,
        password_hash: Option<&str>,
    ) -> DbResult<User> {
        debug!(id = %id, rehash = password_hash.is_some(), "Updating user");

        let username = patch.username.as_deref().map(str::trim);

        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = COALESCE(?2, username),
                password_hash = COALESCE(?3, password_hash),
                name = COALESCE(?4, name),
                account_type = COALESCE(?5, account_type),
                access = COALESCE(?6, access)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(&patch.name)
        .bind(&patch.account_type)
        .bind(patch.access.as_ref().map(Json))
        .execute(&self.pool)
        .await
        .map_err(|e| with_duplicate_value(e.into(), username.unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        USERS.delete_many(&self.pool, ids).await
    }
}
