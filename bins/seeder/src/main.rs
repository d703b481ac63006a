//! Seeds a demo menu and demo cards for local development.
//!
//! Cards are opened through the ledger service, so every demo balance is
//! backed by an opening-balance record. Prints a token per role signed with
//! the configured secret.
//!
//! Usage: cargo run --bin seeder [student-count]

use std::sync::Arc;

use mealcard_core::catalog::{CatalogService, NewMenuItem};
use mealcard_core::ledger::{CardNumberGenerator, LedgerError, LedgerService};
use mealcard_db::{CardRepository, MenuRepository, connect_with};
use mealcard_shared::types::{Credits, UserId};
use mealcard_shared::{AppConfig, JwtConfig, JwtService, Role};
use rand::Rng;
use uuid::Uuid;

const DEFAULT_STUDENTS: usize = 20;

const MENU: &[(&str, i64, &str)] = &[
    ("Chicken Burger", 150, "Main Course"),
    ("Vegetable Sandwich", 80, "Main Course"),
    ("Pasta", 120, "Main Course"),
    ("Pizza Slice", 100, "Main Course"),
    ("Chicken Biryani", 180, "Main Course"),
    ("Vegetable Biryani", 120, "Main Course"),
    ("French Fries", 60, "Snacks"),
    ("Samosa", 25, "Snacks"),
    ("Chicken Roll", 90, "Snacks"),
    ("Paneer Tikka", 140, "Snacks"),
    ("Coffee", 30, "Beverages"),
    ("Tea", 20, "Beverages"),
    ("Orange Juice", 40, "Beverages"),
    ("Lassi", 40, "Beverages"),
    ("Ice Cream", 50, "Desserts"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let students = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => DEFAULT_STUDENTS,
    };

    let config = AppConfig::load()?;
    println!("Connecting to database...");
    let db = connect_with(&config.database).await?;

    println!("Seeding menu...");
    seed_menu(&CatalogService::new(Arc::new(MenuRepository::new(db.clone())))).await?;

    println!("Seeding {students} demo cards...");
    let cards = Arc::new(CardRepository::new(db));
    let admin = UserId::new();
    let mut first_student = None;
    for _ in 0..students {
        let student = UserId::new();
        let grant = Credits::new(rand::rng().random_range(100..=600));
        let ledger = LedgerService::new(
            Arc::clone(&cards),
            CardNumberGenerator::new(config.ledger.card_number_prefix.clone()),
            grant,
        );
        match ledger.open_card(student, Some(admin)).await {
            Ok(card) => {
                println!("  {} -> student {student}, balance {}", card.card_number, card.balance);
                first_student.get_or_insert(student);
            }
            Err(LedgerError::CardNumberTaken(number)) => {
                println!("  Card number {number} kept colliding, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        token_expires_minutes: 24 * 60,
    });
    println!("\nDevelopment tokens (24h):");
    for (role, user) in [
        (Role::Admin, admin.into_inner()),
        (Role::Manager, Uuid::now_v7()),
        (Role::Cashier, Uuid::now_v7()),
    ] {
        println!("  {role}: {}", jwt.issue_token(user, role)?);
    }
    if let Some(student) = first_student {
        println!("  student: {}", jwt.issue_token(student.into_inner(), Role::Student)?);
    }

    println!("Seeding complete!");
    Ok(())
}

async fn seed_menu(catalog: &CatalogService<MenuRepository>) -> anyhow::Result<()> {
    if !catalog.list(false).await?.is_empty() {
        println!("  Menu already present, skipping...");
        return Ok(());
    }

    for &(name, price, category) in MENU {
        catalog
            .create(NewMenuItem {
                name: name.to_string(),
                price: Credits::new(price),
                category: category.to_string(),
                description: None,
                image: None,
                is_available: true,
            })
            .await?;
    }
    println!("  Created {} menu items", MENU.len());
    Ok(())
}
