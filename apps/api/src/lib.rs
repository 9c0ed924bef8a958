//! # Garage API
//!
//! REST server for the garage back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Garage API Routes                               │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │ /api/users     │  │ /api/clients   │  │ /api/sales                 ││
//! │  │                │  │ /api/client/   │  │                            ││
//! │  │ • register     │  │   vehicles     │  │ • paginate (newest first)  ││
//! │  │ • authenticate │  │   discounts    │  │ • report (date filters)    ││
//! │  │ • CRUD         │  │ • CRUD         │  │ • paid-recurring flags     ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐            │
//! │  │ /api/tradings  │  │ /api/inventory │  │ /api/services  │  /health   │
//! │  │ • low-stock    │  │ • CRUD         │  │ • CRUD         │            │
//! │  │ • add-quantity │  │                │  │                │            │
//! │  └────────────────┘  └────────────────┘  └────────────────┘            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Infrastructure: garage-db (SQLite) · garage-core (query logic)  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables use the `GARAGE_`
//! prefix, e.g. `GARAGE_PORT=8080`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use garage_db::Database;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

/// Builds the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api/users", routes::users::router())
        .nest("/api/clients", routes::clients::router())
        .nest("/api/client/vehicles", routes::vehicles::router())
        .nest("/api/client/discounts", routes::discounts::router())
        .nest("/api/tradings", routes::trading::router())
        .nest("/api/inventory", routes::inventory::router())
        .nest("/api/services", routes::services::router())
        .nest("/api/sales", routes::sales::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Serves the router on an ephemeral port and sends one raw request.
    async fn roundtrip(app: Router, method: &str, path: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let request = format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\n\
             Content-Type: application/json\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_paid_recurring_route_is_mounted() {
        let app = router(test_state().await);

        let response = roundtrip(
            app.clone(),
            "PATCH",
            "/api/sales/ghost/paid-recurring",
            r#"{"paid":true}"#,
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.contains(r#""code":"NOT_FOUND""#));

        let response = roundtrip(app, "PATCH", "/api/sales/ghost/status", r#"{"paid":true}"#).await;
        assert!(!response.contains(r#""code":"NOT_FOUND""#));
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = roundtrip(router(test_state().await), "GET", "/health", "").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(r#""status":"serving""#));
    }
}
