//! Example demonstrating account transfers inside MySQL transactions
//!
//! Run with: cargo run --example transfer_demo
//!
//! Needs a MySQL database with the `account` table (see the crate
//! README) reachable via `TELLER_DATABASE_URL`.

use std::sync::Arc;

use teller_core::domain::entities::account::Account;
use teller_core::errors::StoreError;
use teller_core::repositories::AccountRepository;
use teller_core::services::transfer::{AccountTransfer, TransactionalTransfer, TransferService};
use teller_core::transaction::TransactionCoordinator;
use teller_infra::config::DatabaseConfig;
use teller_infra::database::{DatabasePool, MySqlAccountRepository, MySqlConnectionSource};

const FROM: &str = "demo-a";
const TO: &str = "demo-b";
const FROZEN: &str = "demo-frozen";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = DatabaseConfig::from_env();
    let pool = DatabasePool::new(config).await?;
    println!("{}", pool.get_statistics());

    let source = Arc::new(MySqlConnectionSource::new(pool.clone()));
    let coordinator = TransactionCoordinator::new(source);
    let repository = Arc::new(MySqlAccountRepository::new());

    // Each statement commits on its own here; no transaction needed for
    // setup, and delete is idempotent so reruns start clean.
    println!("\n=== Seeding demo accounts ===");
    reset_accounts(&coordinator, &repository).await?;
    print_balances(&coordinator, &repository).await?;

    let service =
        TransferService::new(Arc::clone(&repository)).with_frozen_account(FROZEN);
    let transfer = TransactionalTransfer::new(coordinator.clone(), Arc::new(service));

    println!("\n=== Transfer 2000 from {} to {} ===", FROM, TO);
    match transfer.transfer(FROM, TO, 2_000).await {
        Ok(()) => println!("Transfer committed."),
        Err(e) => println!("Transfer failed: {}", e),
    }
    print_balances(&coordinator, &repository).await?;

    println!("\n=== Transfer 2000 from {} to {} (frozen) ===", FROM, FROZEN);
    match transfer.transfer(FROM, FROZEN, 2_000).await {
        Ok(()) => println!("Transfer committed (unexpected)."),
        Err(e) => println!("Transfer rolled back as expected: {}", e),
    }
    print_balances(&coordinator, &repository).await?;

    println!("\n=== Cleaning up ===");
    delete_accounts(&coordinator, &repository).await?;
    println!("Demo accounts removed.");

    pool.close().await;
    Ok(())
}

/// Deletes any leftover demo rows and seeds fresh ones.
async fn reset_accounts(
    coordinator: &TransactionCoordinator<MySqlConnectionSource>,
    repository: &Arc<MySqlAccountRepository>,
) -> Result<(), StoreError> {
    let repo = Arc::clone(repository);
    coordinator
        .with_connection(move |conn| async move {
            for id in [FROM, TO, FROZEN] {
                repo.delete(&conn, id).await?;
            }
            for id in [FROM, TO, FROZEN] {
                repo.save(&conn, Account::new(id, 10_000)).await?;
            }
            Ok(())
        })
        .await
}

async fn print_balances(
    coordinator: &TransactionCoordinator<MySqlConnectionSource>,
    repository: &Arc<MySqlAccountRepository>,
) -> Result<(), StoreError> {
    let repo = Arc::clone(repository);
    let accounts = coordinator
        .with_connection(move |conn| async move {
            let mut accounts = Vec::new();
            for id in [FROM, TO, FROZEN] {
                accounts.push(repo.find_by_id(&conn, id).await?);
            }
            Ok(accounts)
        })
        .await?;
    for account in accounts {
        println!("  {}: {}", account.id, account.balance);
    }
    Ok(())
}

async fn delete_accounts(
    coordinator: &TransactionCoordinator<MySqlConnectionSource>,
    repository: &Arc<MySqlAccountRepository>,
) -> Result<(), StoreError> {
    let repo = Arc::clone(repository);
    coordinator
        .with_connection(move |conn| async move {
            for id in [FROM, TO, FROZEN] {
                repo.delete(&conn, id).await?;
            }
            Ok(())
        })
        .await
}
