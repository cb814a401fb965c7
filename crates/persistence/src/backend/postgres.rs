// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! PostgreSQL-specific persistence utilities.
//!
//! `PostgreSQL` is the production backend. The standard test suite runs on
//! `SQLite`; this module is validated by the `#[ignore]`d tests in
//! `tests/backend_validation_tests.rs`, which run only via
//! `cargo xtask test-postgres`.
//!
//! ## Schema Parity
//!
//! `MIGRATIONS` embeds `migrations_postgres/`, which must stay
//! schema-equivalent to the `SQLite` migrations in `migrations/`: same
//! tables, columns, constraints, foreign keys, and partial unique indexes.
//! Always change both directories together.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{BigInt, Text};
use diesel::{PgConnection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use super::PoolSettings;
use crate::error::PersistenceError;

/// `PostgreSQL`-specific migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations_postgres");

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Result type for the foreign key check query.
#[derive(QueryableByName)]
struct ForeignKeyCount {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Builds a connection URL from discrete settings, percent-encoding the
/// credentials.
#[must_use]
pub fn connection_url(host: &str, port: u16, user: &str, password: &str, name: &str) -> String {
    format!(
        "postgres://{}:{}@{host}:{port}/{name}",
        encode_userinfo(user),
        encode_userinfo(password)
    )
}

fn encode_userinfo(value: &str) -> String {
    let mut out: String = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Locks one catalog row for the rest of the transaction.
///
/// # Errors
///
/// Returns an error if the lock cannot be taken.
pub fn lock_row(
    conn: &mut PgConnection,
    table: &'static str,
    id: i64,
) -> Result<(), PersistenceError> {
    diesel::sql_query(format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE"))
        .bind::<BigInt, _>(id)
        .execute(conn)?;
    Ok(())
}

/// Caps every following statement in the current transaction.
///
/// # Errors
///
/// Returns an error if the setting cannot be applied.
pub fn set_statement_timeout(conn: &mut PgConnection, millis: u64) -> Result<(), PersistenceError> {
    // SET does not accept bind parameters
    diesel::sql_query(format!("SET LOCAL statement_timeout = {millis}")).execute(conn)?;
    Ok(())
}

/// Verifies that the catalog foreign keys exist.
///
/// `PostgreSQL` always enforces declared foreign keys, so the check confirms
/// that the migrations created them.
///
/// # Errors
///
/// Returns an error if no foreign key constraints are present.
pub fn verify_foreign_key_enforcement(conn: &mut PgConnection) -> Result<(), PersistenceError> {
    let found: i64 = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM information_schema.table_constraints \
         WHERE constraint_type = 'FOREIGN KEY' AND table_name = $1",
    )
    .bind::<Text, _>("subjects")
    .get_result::<ForeignKeyCount>(conn)?
    .count;

    if found == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    info!("PostgreSQL foreign key constraints are present");
    Ok(())
}

/// Run pending migrations on the provided connection.
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(conn: &mut PgConnection) -> Result<(), PersistenceError> {
    info!("Running PostgreSQL database migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    Ok(())
}

/// Opens a pool and runs migrations.
///
/// # Errors
///
/// Returns an error if connection or migration fails.
pub fn initialize_pool(
    database_url: &str,
    settings: PoolSettings,
) -> Result<PgPool, PersistenceError> {
    info!(
        max_open = settings.max_open,
        max_idle = settings.max_idle,
        "Initializing PostgreSQL connection pool"
    );
    let manager: ConnectionManager<PgConnection> = ConnectionManager::new(database_url);
    let pool: PgPool = Pool::builder()
        .max_size(settings.max_open.max(1))
        .min_idle(Some(settings.max_idle.min(settings.max_open)))
        .max_lifetime(settings.max_lifetime)
        .connection_timeout(settings.connect_timeout)
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    verify_foreign_key_enforcement(&mut conn)?;
    Ok(pool)
}
