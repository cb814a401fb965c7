// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-specific backend utilities.
//!
//! This module is limited to:
//! - Pool construction and per-connection `PRAGMA` setup
//! - Migration execution
//! - `busy_timeout` as the `SQLite` stand-in for a statement timeout
//!
//! All catalog queries and mutations must remain backend-agnostic
//! and live in `queries/` or `mutations/` modules.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_types::Integer;
use diesel::{RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::time::Duration;
use tracing::info;

use super::PoolSettings;
use crate::error::PersistenceError;

/// SQLite-specific migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Lock wait applied to fresh connections before any deadline narrows it.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Helper row struct for PRAGMA queries.
///
/// This is a justified use of raw SQL as Diesel has no PRAGMA DSL.
#[derive(QueryableByName)]
struct PragmaRow {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Applies connection-scoped pragmas every time the pool opens a connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionPragmas {
    wal: bool,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {DEFAULT_BUSY_TIMEOUT_MS}"))
            .execute(conn)
            .map_err(diesel::r2d2::Error::QueryError)?;
        if self.wal {
            diesel::sql_query("PRAGMA journal_mode = WAL")
                .execute(conn)
                .map_err(diesel::r2d2::Error::QueryError)?;
        }
        Ok(())
    }
}

/// Verifies that foreign key enforcement is enabled.
///
/// # Errors
///
/// Returns an error if foreign key enforcement is not enabled.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (justified - Diesel has no PRAGMA DSL)
    let foreign_keys_enabled: i32 = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<PragmaRow>(conn)?
        .foreign_keys;

    if foreign_keys_enabled == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("SQLite foreign key enforcement is enabled");
    Ok(())
}

/// Sets how long a statement waits on a locked database.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn set_busy_timeout(conn: &mut SqliteConnection, millis: u64) -> Result<(), PersistenceError> {
    diesel::sql_query(format!("PRAGMA busy_timeout = {millis}")).execute(conn)?;
    Ok(())
}

/// Run pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    info!("Running SQLite database migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    Ok(())
}

fn build_pool(
    database_url: &str,
    settings: PoolSettings,
    wal: bool,
) -> Result<SqlitePool, PersistenceError> {
    let manager: ConnectionManager<SqliteConnection> = ConnectionManager::new(database_url);
    let pool: SqlitePool = Pool::builder()
        .max_size(settings.max_open.max(1))
        .min_idle(Some(settings.max_idle.min(settings.max_open).max(1)))
        .max_lifetime(settings.max_lifetime)
        .idle_timeout(settings.max_lifetime)
        .connection_timeout(settings.connect_timeout)
        .connection_customizer(Box::new(ConnectionPragmas { wal }))
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    verify_foreign_key_enforcement(&mut conn)?;
    Ok(pool)
}

/// Opens a pool over a file database in WAL mode and runs migrations.
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_file_pool(
    path: &str,
    settings: PoolSettings,
) -> Result<SqlitePool, PersistenceError> {
    info!(path, "Initializing SQLite database");
    build_pool(path, settings, true)
}

/// Opens a single-connection pool over a private shared-cache in-memory
/// database and runs migrations.
///
/// The pool never lets its only connection go idle-expire, so the database
/// lives exactly as long as the pool.
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_memory_pool(shared_memory_url: &str) -> Result<SqlitePool, PersistenceError> {
    let settings: PoolSettings = PoolSettings {
        max_open: 1,
        max_idle: 1,
        max_lifetime: None,
        connect_timeout: Duration::from_secs(5),
    };
    build_pool(shared_memory_url, settings, false)
}
