pub mod entities;
mod poll_repository;
mod roster_repository;
mod vote_repository;

pub use poll_repository::PollRepository;
pub use roster_repository::RosterRepository;
pub use vote_repository::VoteRepository;

use crate::config::DatabaseConfig;
use election_errors::{AppError, AppResult};
use sea_orm::{
    AccessMode, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, DbErr, IsolationLevel, Statement, TransactionTrait,
};
use std::time::Duration;

const INITIAL_MIGRATION: &str = include_str!("../../../../migrations/001_initial.sql");

pub async fn create_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.as_str());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    apply_migration(db, INITIAL_MIGRATION).await?;
    tracing::info!("Migrations applied");
    Ok(())
}

/// Runs each `;`-separated statement in order. Objects that already exist are
/// skipped; any other failure aborts the migration.
async fn apply_migration<C: ConnectionTrait>(db: &C, migration: &str) -> Result<(), DbErr> {
    for statement in migration.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        let result = db
            .execute(Statement::from_string(db.get_database_backend(), statement.to_string()))
            .await;

        match result {
            Ok(_) => {}
            Err(e) if e.to_string().contains("already exists") => {
                tracing::debug!(error = %e, "Migration statement skipped");
            }
            Err(e) => {
                tracing::error!(error = %e, "Migration statement failed");
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Opens a read-only, repeatable-read transaction so that every query of one
/// operation sees the same committed state.
pub async fn read_snapshot(db: &DatabaseConnection) -> AppResult<DatabaseTransaction> {
    db.begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
        .await
        .map_err(db_error)
}

pub async fn close_snapshot(txn: DatabaseTransaction) -> AppResult<()> {
    txn.commit().await.map_err(db_error)
}

pub(crate) fn db_error(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// COUNT(*) comes back as a signed BIGINT.
pub(crate) fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
