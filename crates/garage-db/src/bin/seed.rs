//! # Seed Data Generator
//!
//! Populates the database with clients, vehicles, stock and sales for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 25 clients (default) with their vehicles and sales
//! cargo run -p garage-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p garage-db --bin seed -- --count 100
//!
//! # Specify database path
//! cargo run -p garage-db --bin seed -- --db ./data/garage.db
//! ```
//!
//! ## Generated Data
//! - One trading item per tyre size in `TYRE_SIZES`, some below the
//!   low-stock threshold
//! - A fixed service menu
//! - `count` clients, each with one vehicle, a loyalty discount on every
//!   third client, and one sale per client spread over the last 90 days

use chrono::{Duration, Utc};
use garage_core::{
    CartLine, Money, NewClient, NewDiscount, NewSale, NewService, NewTradingItem, NewVehicle,
    TradingItem,
};
use garage_db::repository::generate_id;
use garage_db::{Database, DbConfig};
use std::env;

/// (size, brand, price in cents)
const TYRE_SIZES: &[(&str, &str, i64)] = &[
    ("175/65R14", "Bridgestone", 5_200),
    ("185/60R15", "Michelin", 6_400),
    ("195/65R15", "Continental", 6_900),
    ("205/55R16", "Pirelli", 8_100),
    ("215/60R16", "Goodyear", 8_800),
    ("225/45R17", "Michelin", 11_500),
    ("235/55R18", "Yokohama", 13_900),
    ("265/70R16", "BFGoodrich", 15_200),
];

/// (category, name, duration, price in cents)
const SERVICES: &[(&str, &str, &str, i64)] = &[
    ("Tyres", "Wheel alignment", "45 min", 4_500),
    ("Tyres", "Wheel balancing", "30 min", 2_500),
    ("Tyres", "Puncture repair", "20 min", 1_500),
    ("Maintenance", "Oil change", "30 min", 3_500),
    ("Maintenance", "Brake inspection", "40 min", 3_000),
];

const BRANCHES: &[&str] = &["North", "South", "Harbour"];

const VEHICLES: &[(&str, &str)] = &[
    ("Toyota", "Corolla"),
    ("Honda", "Civic"),
    ("Ford", "Ranger"),
    ("Mazda", "CX-5"),
    ("Volkswagen", "Golf"),
    ("Nissan", "Navara"),
];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Ben", "Carla", "Dmitri", "Elif", "Farah", "Goran", "Hana", "Ivo", "Jules",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Bauer", "Costa", "Duarte", "Evans", "Fischer", "Garcia", "Horvat",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 25;
    let mut db_path = String::from("./garage_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Garage Back Office Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of clients to generate (default: 25)");
                println!("  -d, --db <PATH>    Database file path (default: ./garage_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Garage Back Office Seed Data Generator");
    println!("======================================");
    println!("Database: {}", db_path);
    println!("Clients:  {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    if !db.clients().list_all().await?.is_empty() {
        println!("⚠ Database already has clients");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let stock = seed_stock(&db).await?;
    println!("✓ {} trading items", stock.len());

    seed_services(&db).await?;
    println!("✓ {} services", SERVICES.len());

    let mut sales = 0;
    let mut revenue = Money::zero();
    for n in 0..count {
        let now = Utc::now();
        let client = NewClient {
            company: if n % 4 == 0 {
                format!("Fleet {} Ltd", n)
            } else {
                String::new()
            },
            name: format!(
                "{} {}",
                FIRST_NAMES[n % FIRST_NAMES.len()],
                LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()]
            ),
            email: format!("client{}@example.com", n),
            contact: format!("+1 555 {:04}", n),
            date_issued: Some(now - Duration::days((n % 365) as i64)),
        }
        .into_client(generate_id(), now);
        let client = db.clients().insert(&client).await?;

        let (manufacturer, model) = VEHICLES[n % VEHICLES.len()];
        let vehicle = NewVehicle {
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            plate_number: format!("GAR-{:04}", n),
            client_id: client.id.clone(),
        }
        .into_vehicle(generate_id());
        db.vehicles().insert(&vehicle).await?;

        let mut discount_cents = 0;
        if n % 3 == 0 {
            discount_cents = 500;
            let discount = NewDiscount {
                value_cents: discount_cents,
                client_id: client.id.clone(),
                date_issued: None,
            }
            .into_discount(generate_id(), now);
            db.discounts().insert(&discount).await?;
        }

        if stock.is_empty() {
            continue;
        }
        let item = &stock[n % stock.len()];
        let quantity = if n % 2 == 0 { 4 } else { 2 };
        let sale = NewSale {
            transaction_number: None,
            branch: BRANCHES[n % BRANCHES.len()].to_string(),
            client_id: client.id.clone(),
            cart: vec![CartLine {
                item_id: item.id.clone(),
                item_price_cents: item.selling_price_cents,
                quantity,
                sub_total_cents: (item.selling_price() * quantity).cents(),
            }],
            discount_cents,
            total_price_cents: None,
            paid: n % 5 != 0,
            date_issued: Some(now - Duration::days(((n * 7) % 90) as i64)),
            recurring: n % 6 == 0,
        }
        .into_sale(generate_id(), now);

        match db.sales().insert(&sale).await {
            Ok(stored) => {
                sales += 1;
                revenue += Money::from_cents(stored.total_price_cents);
            }
            Err(e) => eprintln!("Failed to insert sale for {}: {}", client.name, e),
        }
    }

    println!("✓ {} clients with vehicles", count);
    println!("✓ {} sales, {} total", sales, revenue);

    let low = db.trading().low_stock().await?;
    println!("  Low stock items: {}", low.len());

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

async fn seed_stock(db: &Database) -> Result<Vec<TradingItem>, Box<dyn std::error::Error>> {
    let mut items = Vec::with_capacity(TYRE_SIZES.len());
    for (idx, (size, brand, price)) in TYRE_SIZES.iter().enumerate() {
        let item = NewTradingItem {
            category: "Tyres".to_string(),
            size: size.to_string(),
            brand: brand.to_string(),
            description: None,
            // Every third size starts below the low-stock threshold
            quantity: if idx % 3 == 0 { 4 } else { 24 + idx as i64 * 4 },
            unit: "pcs".to_string(),
            selling_price_cents: *price,
        }
        .into_trading_item(generate_id());
        items.push(db.trading().insert(&item).await?);
    }
    Ok(items)
}

async fn seed_services(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    for (category, name, duration, price) in SERVICES {
        let service = NewService {
            category: category.to_string(),
            name: name.to_string(),
            description: String::new(),
            duration: duration.to_string(),
            frequency: String::new(),
            price_cents: *price,
        }
        .into_service(generate_id());
        db.services().insert(&service).await?;
    }
    Ok(())
}
