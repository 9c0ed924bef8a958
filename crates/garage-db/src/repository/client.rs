//! # Client Repository
//!
//! Customers of the garage. Email addresses are unique and stored
//! lowercased.

use garage_core::query::{schema, Page, SearchQuery};
use garage_core::{Client, ClientPatch};
use sqlx::SqlitePool;
use tracing::debug;

use super::with_duplicate_value;
use crate::error::{DbError, DbResult};
use crate::listing::Table;

pub(crate) const CLIENTS: Table = Table {
    name: "clients",
    columns: "id, company, name, email, contact, date_issued",
};

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<Client>> {
        CLIENTS.all(&self.pool, None).await
    }

    /// Paginated search on name.
    pub async fn search(&self, query: &SearchQuery) -> DbResult<Page<Client>> {
        CLIENTS.search(&self.pool, &schema::CLIENTS, query).await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        CLIENTS.get(&self.pool, id).await
    }

    pub async fn insert(&self, client: &Client) -> DbResult<Client> {
        debug!(id = %client.id, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (id, company, name, email, contact, date_issued)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&client.id)
        .bind(&client.company)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.contact)
        .bind(client.date_issued)
        .execute(&self.pool)
        .await
        .map_err(|e| with_duplicate_value(e.into(), &client.email))?;

        Ok(client.clone())
    }

    /// Applies the fields present in `patch`.
    pub async fn update(&self, id: &str, patch: &ClientPatch) -> DbResult<Client> {
        debug!(id = %id, "Updating client");

        let email = patch.email.as_deref().map(|e| e.trim().to_lowercase());

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                company = COALESCE(?2, company),
                name = COALESCE(?3, name),
                email = COALESCE(?4, email),
                contact = COALESCE(?5, contact),
                date_issued = COALESCE(?6, date_issued)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.company)
        .bind(&patch.name)
        .bind(&email)
        .bind(&patch.contact)
        .bind(patch.date_issued)
        .execute(&self.pool)
        .await
        .map_err(|e| with_duplicate_value(e.into(), email.as_deref().unwrap_or_default()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))
    }

    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        CLIENTS.delete_many(&self.pool, ids).await
    }
}
