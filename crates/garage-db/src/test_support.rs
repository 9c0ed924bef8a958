//! Fixtures shared by the repository tests.

use chrono::Utc;
use garage_core::{Client, NewClient, NewTradingItem, TradingItem};

use crate::repository::generate_id;
use crate::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn seed_client(db: &Database, name: &str, email: &str) -> Client {
    let client = NewClient {
        company: String::new(),
        name: name.to_string(),
        email: email.to_string(),
        contact: String::new(),
        date_issued: None,
    }
    .into_client(generate_id(), Utc::now());
    db.clients().insert(&client).await.unwrap()
}

pub async fn seed_trading_item(db: &Database, size: &str, quantity: i64) -> TradingItem {
    let item = NewTradingItem {
        category: "Tyres".to_string(),
        size: size.to_string(),
        brand: "Michelin".to_string(),
        description: None,
        quantity,
        unit: "pcs".to_string(),
        selling_price_cents: 7_500,
    }
    .into_trading_item(generate_id());
    db.trading().insert(&item).await.unwrap()
}
