//! Database seeder for Bankdesk development and testing.
//!
//! Seeds three clients, five accounts with fixed numbers and a handful of
//! movements posted through the posting engine. Running it twice is harmless.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;

use anyhow::Context;
use bankdesk_core::customer::{AccountType, hash_password};
use bankdesk_core::ledger::{PostingEngine, PostingRules};
use bankdesk_db::entities::{accounts, clients, movements};
use bankdesk_db::repositories::PgLedgerStore;
use bankdesk_shared::AppConfig;
use bankdesk_shared::types::AccountNumber;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

struct SeedClient {
    name: &'static str,
    gender: &'static str,
    age: i16,
    identification: &'static str,
    address: &'static str,
    phone: &'static str,
    password: &'static str,
}

const CLIENTS: [SeedClient; 3] = [
    SeedClient {
        name: "Jose Lema",
        gender: "M",
        age: 35,
        identification: "1712345678",
        address: "Otavalo sn y principal",
        phone: "098254785",
        password: "1234",
    },
    SeedClient {
        name: "Marianela Montalvo",
        gender: "F",
        age: 28,
        identification: "1723456789",
        address: "Amazonas y NNUU",
        phone: "097548965",
        password: "5678",
    },
    SeedClient {
        name: "Juan Osorio",
        gender: "M",
        age: 40,
        identification: "1734567890",
        address: "13 junio y Equinoccial",
        phone: "098874587",
        password: "1245",
    },
];

/// (number, owner identification, type, opening balance)
const ACCOUNTS: [(u32, &str, AccountType, &str); 5] = [
    (478_758, "1712345678", AccountType::Savings, "2000"),
    (225_487, "1723456789", AccountType::Checking, "100"),
    (495_878, "1734567890", AccountType::Savings, "0"),
    (496_825, "1723456789", AccountType::Savings, "540"),
    (585_545, "1712345678", AccountType::Checking, "1000"),
];

/// (account number, kind, amount)
const MOVEMENTS: [(u32, &str, &str); 4] = [
    (478_758, "debit", "575"),
    (225_487, "credit", "600"),
    (495_878, "credit", "150"),
    (496_825, "debit", "540"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = bankdesk_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding clients...");
    seed_clients(&db).await?;

    println!("Seeding accounts...");
    seed_accounts(&db).await?;

    println!("Seeding movements...");
    let rules = PostingRules::new(
        config.business_rules.daily_debit_limit,
        config.business_rules.timezone()?,
    );
    seed_movements(PostingEngine::new(PgLedgerStore::new(db.clone()), rules), &db).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_clients(db: &DatabaseConnection) -> anyhow::Result<()> {
    for seed in &CLIENTS {
        let exists = clients::Entity::find()
            .filter(clients::Column::Identification.eq(seed.identification))
            .one(db)
            .await?
            .is_some();
        if exists {
            println!("  Client {} already exists, skipping...", seed.name);
            continue;
        }

        let now = chrono::Utc::now().into();
        clients::ActiveModel {
            name: Set(seed.name.to_string()),
            gender: Set(seed.gender.to_string()),
            age: Set(seed.age),
            identification: Set(seed.identification.to_string()),
            address: Set(seed.address.to_string()),
            phone: Set(seed.phone.to_string()),
            password_hash: Set(hash_password(seed.password)?),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        println!("  Created client {}", seed.name);
    }
    Ok(())
}

async fn seed_accounts(db: &DatabaseConnection) -> anyhow::Result<()> {
    for (number, identification, account_type, opening) in ACCOUNTS {
        let number = AccountNumber::new(number)?;
        let exists = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number.as_i32()))
            .one(db)
            .await?
            .is_some();
        if exists {
            println!("  Account {number} already exists, skipping...");
            continue;
        }

        let owner = clients::Entity::find()
            .filter(clients::Column::Identification.eq(identification))
            .one(db)
            .await?
            .with_context(|| format!("owner {identification} of account {number} is missing"))?;

        let now = chrono::Utc::now().into();
        accounts::ActiveModel {
            number: Set(number.as_i32()),
            client_id: Set(owner.id),
            account_type: Set(account_type.into()),
            opening_balance: Set(Decimal::from_str(opening)?),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        println!("  Created {account_type} account {number} for {}", owner.name);
    }
    Ok(())
}

async fn seed_movements(
    engine: PostingEngine<PgLedgerStore>,
    db: &DatabaseConnection,
) -> anyhow::Result<()> {
    for (number, kind, amount) in MOVEMENTS {
        let number = AccountNumber::new(number)?;
        let account = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number.as_i32()))
            .one(db)
            .await?
            .with_context(|| format!("account {number} is missing"))?;
        let posted = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account.id))
            .count(db)
            .await?;
        if posted > 0 {
            println!("  Account {number} already has movements, skipping...");
            continue;
        }

        let movement = engine.post(number, kind, Decimal::from_str(amount)?).await?;
        println!(
            "  Posted {kind} of {amount} to {number}, balance {}",
            movement.balance
        );
    }
    Ok(())
}
