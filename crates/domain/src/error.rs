// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error taxonomy shared by every layer of the catalog.
//!
//! Every failure is classified into one [`ErrorKind`]. The kind decides how
//! callers react (retry, HTTP status, logging level); the message is only
//! informational. Two errors compare equal when their kinds match.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;

use crate::validation::rule;

/// The closed set of error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The addressed record does not exist or has been soft-deleted.
    NotFound,
    /// A uniqueness rule was violated.
    DuplicateKey,
    /// A field or cross-field rule was violated.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// An academic year outside the accepted range.
    InvalidYear,
    /// The database reported an unexpected failure.
    #[serde(rename = "DATABASE_ERROR")]
    Database,
    /// The request deadline expired.
    Timeout,
    /// The database kept aborting the transaction after all retries.
    Deadlock,
    /// A path parameter, query parameter, or body could not be parsed.
    InvalidInput,
    /// The caller could not be identified.
    Authentication,
    /// The caller is not allowed to perform the operation.
    Authorization,
}

impl ErrorKind {
    /// Machine-readable code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::Validation => "VALIDATION_ERROR",
            Self::InvalidYear => "INVALID_YEAR",
            Self::Database => "DATABASE_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Deadlock => "DEADLOCK",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Authentication => "AUTHENTICATION",
            Self::Authorization => "AUTHORIZATION",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One structured validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path of the offending field, e.g. `departments[0].majors[1].name`.
    pub field: String,
    /// Stable rule identifier, see [`rule`].
    pub rule: String,
    /// Human-readable explanation.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(field: impl Into<String>, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    /// Returns a copy of this violation with `prefix` prepended to its field path.
    #[must_use]
    pub fn under(mut self, prefix: &str) -> Self {
        if !prefix.is_empty() {
            self.field = if self.field.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}.{}", self.field)
            };
        }
        self
    }

    /// The error kind a failure of this rule surfaces as.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.rule.as_str() {
            rule::INVALID_YEAR => ErrorKind::InvalidYear,
            rule::DUPLICATE_SCHEDULE_NAME
            | rule::DUPLICATE_SCHEDULE_ORDER
            | rule::DUPLICATE_DISPLAY_ORDER => ErrorKind::DuplicateKey,
            _ => ErrorKind::Validation,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.rule, self.message)
    }
}

/// A categorised error with call-site annotations.
#[derive(Debug, Clone)]
pub struct CatalogError {
    kind: ErrorKind,
    message: String,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
    operation: Option<String>,
    table: Option<String>,
    timestamp: OffsetDateTime,
    context: BTreeMap<String, String>,
    violations: Vec<Violation>,
}

impl CatalogError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            operation: None,
            table: None,
            timestamp: OffsetDateTime::now_utc(),
            context: BTreeMap::new(),
            violations: Vec::new(),
        }
    }

    /// A record of type `resource` with identifier `id` does not exist.
    #[must_use]
    pub fn not_found(resource: &str, id: i64) -> Self {
        Self::new(ErrorKind::NotFound, format!("{resource} {id} not found"))
            .with_context("resource", resource)
            .with_context("id", id.to_string())
    }

    /// Malformed caller input for `field`.
    #[must_use]
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message).with_context("field", field)
    }

    /// Builds an error from validation violations.
    ///
    /// The first violation decides the kind so that, for example, an
    /// out-of-range academic year surfaces as `INVALID_YEAR`.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let kind: ErrorKind = violations
            .first()
            .map_or(ErrorKind::Validation, Violation::kind);
        let message: String = match violations.first() {
            Some(first) if violations.len() == 1 => first.message.clone(),
            Some(first) => format!(
                "{} (and {} more violation(s))",
                first.message,
                violations.len() - 1
            ),
            None => String::from("validation failed"),
        };
        let mut err: Self = Self::new(kind, message);
        err.violations = violations;
        err
    }

    /// The caller supplied a version that no longer matches the stored one.
    #[must_use]
    pub fn stale_version(resource: &str, id: i64, supplied: i64, stored: i64) -> Self {
        Self::from_violations(vec![Violation::new(
            "version",
            rule::STALE_VERSION,
            format!(
                "stale_version: {resource} {id} was modified concurrently (supplied version {supplied}, stored version {stored})"
            ),
        )])
        .with_context("resource", resource)
        .with_context("id", id.to_string())
    }

    /// The request deadline expired during `operation`.
    #[must_use]
    pub fn timeout(operation: &str) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("deadline exceeded during {operation}"),
        )
        .with_operation(operation)
    }

    /// Attaches the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Attaches the target table, keeping one already set closer to the failure.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        if self.table.is_none() {
            self.table = Some(table.into());
        }
        self
    }

    /// Adds a context annotation.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Wraps a lower-level cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Machine-readable code, identical to the kind's code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    #[must_use]
    pub const fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    #[must_use]
    pub const fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Rule identifier of the first violation, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        self.violations.first().map(|v| v.rule.as_str())
    }

    /// Returns true when this error has the given kind.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl PartialEq for CatalogError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)?;
        if let Some(operation) = &self.operation {
            write!(f, " (operation={operation}")?;
            if let Some(table) = &self.table {
                write!(f, ", table={table}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}
