// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use std::collections::BTreeMap;

use nyushi_domain::{CatalogError, ErrorKind, Violation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, warn};

/// HTTP status a failure of `kind` is answered with.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::NotFound => 404,
        ErrorKind::Validation | ErrorKind::InvalidInput | ErrorKind::InvalidYear => 400,
        ErrorKind::Authentication => 401,
        ErrorKind::Authorization => 403,
        ErrorKind::DuplicateKey => 409,
        ErrorKind::Timeout => 504,
        ErrorKind::Deadlock | ErrorKind::Database => 500,
    }
}

/// Optional structured part of an error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    /// When the error was raised, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// The JSON error body: `{code, message, details}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error kind code, e.g. `VALIDATION_ERROR`.
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// API-level error: the status to answer with and the body to send.
///
/// This is distinct from [`CatalogError`] and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub body: ErrorResponse,
}

impl ApiError {
    /// A request body that could not be decoded.
    #[must_use]
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        CatalogError::invalid_input("body", format!("malformed request body: {}", reason.into()))
            .into()
    }

    /// A body identifier that disagrees with the identifier in the path.
    #[must_use]
    pub fn mismatched_id(field: &str, path_id: i64, body_id: i64) -> Self {
        CatalogError::invalid_input(
            field,
            format!("{field} in the body ({body_id}) does not match the path ({path_id})"),
        )
        .into()
    }

    /// The request ran past its deadline before the repository answered.
    #[must_use]
    pub fn deadline_exceeded(operation: &str) -> Self {
        CatalogError::timeout(operation).into()
    }

    /// The error kind code carried by the body.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.body.code
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.body.code, self.body.message)
    }
}

impl std::error::Error for ApiError {}

/// Translates a catalog error into an API error.
///
/// This translation is explicit so that internal error values never reach a
/// response body directly.
#[must_use]
pub fn translate_catalog_error(err: &CatalogError) -> ApiError {
    let status: u16 = status_for(err.kind());
    if status >= 500 {
        error!(
            code = err.code(),
            operation = err.operation().unwrap_or_default(),
            table = err.table().unwrap_or_default(),
            error = %err,
            "Request failed"
        );
    } else {
        warn!(code = err.code(), error = %err, "Request rejected");
    }

    let details: ErrorDetails = ErrorDetails {
        violations: err.violations().to_vec(),
        operation: err.operation().map(str::to_string),
        table: err.table().map(str::to_string),
        context: err.context().clone(),
        timestamp: format_timestamp(err.timestamp()),
    };
    ApiError {
        status,
        body: ErrorResponse {
            code: err.code().to_string(),
            message: err.message().to_string(),
            details: Some(details),
        },
    }
}

fn format_timestamp(value: OffsetDateTime) -> Option<String> {
    value.format(&Rfc3339).ok()
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        translate_catalog_error(&err)
    }
}
