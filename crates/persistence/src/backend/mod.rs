// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! This module isolates backend-specific initialization, migration,
//! pooling, and the few operations that cannot be expressed in
//! backend-agnostic Diesel DSL.
//!
//! ## Backend Support
//!
//! - `sqlite`: `SQLite` backend (development and testing)
//! - `postgres`: `PostgreSQL` backend (production; validated via opt-in tests)
//!
//! All catalog queries and mutations live in `queries/` and `mutations/`
//! and must work on both backends.

pub mod postgres;
pub mod sqlite;

use diesel::{Connection, PgConnection, SqliteConnection};
use std::time::Duration;

use crate::deadline::Deadline;
use crate::error::PersistenceError;

/// Connection pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections.
    pub max_open: u32,
    /// Connections kept open while idle.
    pub max_idle: u32,
    /// Connections older than this are recycled. `None` keeps them forever.
    pub max_lifetime: Option<Duration>,
    /// How long startup waits for the first connections.
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_open: 100,
            max_idle: 10,
            max_lifetime: Some(Duration::from_secs(3600)),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Trait for backend-specific operations.
///
/// Query and mutation code that must run on either backend reaches the
/// database-specific parts (transaction mode, row locks, statement
/// timeouts) only through this trait.
pub trait PersistenceBackend: Connection + Sized {
    /// Short backend name for logs and health reports.
    const NAME: &'static str;

    /// Runs `f` in a transaction that holds write intent from its first
    /// statement.
    ///
    /// # Errors
    ///
    /// Returns the error of `f` (after rolling back) or of the commit.
    fn write_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>;

    /// Runs `f` in a transaction suited to multi-statement consistent reads.
    ///
    /// # Errors
    ///
    /// Returns the error of `f` or of the commit.
    fn read_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>;

    /// Locks the row `id` of `table` until the enclosing transaction ends.
    ///
    /// `table` must be one of the catalog table names.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be taken.
    fn lock_row(&mut self, table: &'static str, id: i64) -> Result<(), PersistenceError>;

    /// Bounds statement execution inside the current transaction by the
    /// time left on `deadline`.
    ///
    /// # Errors
    ///
    /// Returns an error if the setting cannot be applied.
    fn apply_deadline(&mut self, deadline: &Deadline) -> Result<(), PersistenceError>;

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// This is a startup-time check to ensure referential integrity
    /// constraints are enforced by the database backend.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    const NAME: &'static str = "sqlite";

    fn write_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.immediate_transaction(f)
    }

    fn read_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.transaction(f)
    }

    fn lock_row(&mut self, _table: &'static str, _id: i64) -> Result<(), PersistenceError> {
        // BEGIN IMMEDIATE already holds the database write lock
        Ok(())
    }

    fn apply_deadline(&mut self, deadline: &Deadline) -> Result<(), PersistenceError> {
        sqlite::set_busy_timeout(self, deadline.remaining_millis())
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }
}

impl PersistenceBackend for PgConnection {
    const NAME: &'static str = "postgres";

    fn write_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.build_transaction().read_committed().run(f)
    }

    fn read_transaction<T, F>(&mut self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Self) -> Result<T, PersistenceError>,
    {
        self.build_transaction().repeatable_read().read_only().run(f)
    }

    fn lock_row(&mut self, table: &'static str, id: i64) -> Result<(), PersistenceError> {
        postgres::lock_row(self, table, id)
    }

    fn apply_deadline(&mut self, deadline: &Deadline) -> Result<(), PersistenceError> {
        postgres::set_statement_timeout(self, deadline.remaining_millis())
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        postgres::verify_foreign_key_enforcement(self)
    }
}
