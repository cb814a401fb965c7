// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;
use nyushi_domain::{CatalogError, ErrorKind};

/// Errors that can occur during persistence operations.
///
/// Driver failures are classified on conversion so that retry and status
/// decisions never have to inspect driver messages again.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// A unique index rejected the write.
    DuplicateKey(String),
    /// The transaction was chosen as a deadlock or serialization victim,
    /// or the database stayed locked.
    Deadlock(String),
    /// A statement or pool checkout outlived the request deadline.
    Timeout(String),
    /// The requested row was not found.
    NotFound(String),
    /// A stored value could not be decoded.
    CorruptRow(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A catalog rule failed inside a transaction.
    Catalog(CatalogError),
}

impl PersistenceError {
    /// Returns true when the failure may succeed on a fresh attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Deadlock(_))
    }

    /// Converts into the shared taxonomy, annotated with the failing call site.
    #[must_use]
    pub fn into_catalog(self, operation: &str, table: &str) -> CatalogError {
        let err: CatalogError = match &self {
            Self::Catalog(inner) => inner.clone(),
            Self::NotFound(msg) => CatalogError::new(ErrorKind::NotFound, msg.clone()),
            Self::DuplicateKey(msg) => {
                CatalogError::new(ErrorKind::DuplicateKey, format!("duplicate key: {msg}"))
            }
            Self::Deadlock(msg) => CatalogError::new(
                ErrorKind::Deadlock,
                format!("transaction aborted after retries: {msg}"),
            ),
            Self::Timeout(msg) => CatalogError::new(
                ErrorKind::Timeout,
                format!("deadline exceeded during {operation}: {msg}"),
            ),
            other => CatalogError::new(ErrorKind::Database, other.to_string()),
        };
        let err: CatalogError = if matches!(self, Self::Catalog(_)) {
            err
        } else {
            err.with_source(self)
        };
        if err.operation().is_some() {
            err.with_table(table)
        } else {
            err.with_operation(operation).with_table(table)
        }
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::DuplicateKey(msg) => write!(f, "Duplicate key: {msg}"),
            Self::Deadlock(msg) => write!(f, "Deadlock: {msg}"),
            Self::Timeout(msg) => write!(f, "Timeout: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::CorruptRow(msg) => write!(f, "Corrupt row: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::Catalog(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<CatalogError> for PersistenceError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(kind, info) => {
                let message: String = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => Self::DuplicateKey(message),
                    DatabaseErrorKind::SerializationFailure => Self::Deadlock(message),
                    _ => classify_message(message),
                }
            }
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

/// Classifies driver errors that carry no dedicated `DatabaseErrorKind`.
fn classify_message(message: String) -> PersistenceError {
    let lower: String = message.to_lowercase();
    if lower.contains("deadlock")
        || lower.contains("database is locked")
        || lower.contains("database table is locked")
    {
        PersistenceError::Deadlock(message)
    } else if lower.contains("statement timeout") || lower.contains("canceling statement") {
        PersistenceError::Timeout(message)
    } else {
        PersistenceError::DatabaseError(message)
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for PersistenceError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        let message: String = err.to_string();
        if message.contains("timed out") {
            Self::Timeout(message)
        } else {
            Self::DatabaseConnectionFailed(message)
        }
    }
}

impl From<time::error::Parse> for PersistenceError {
    fn from(err: time::error::Parse) -> Self {
        Self::CorruptRow(format!("invalid timestamp: {err}"))
    }
}

impl From<time::error::Format> for PersistenceError {
    fn from(err: time::error::Format) -> Self {
        Self::DatabaseError(format!("timestamp formatting failed: {err}"))
    }
}
