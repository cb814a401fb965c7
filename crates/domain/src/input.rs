// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parsing and policy checks for raw caller input.

use unicode_normalization::UnicodeNormalization;

use crate::error::CatalogError;

/// Maximum search query length, in characters, after trimming.
pub const SEARCH_QUERY_MAX_CHARS: usize = 100;

pub const SEARCH_QUERY_REQUIRED: &str = "検索クエリは必須です";
pub const SEARCH_QUERY_TOO_LONG: &str = "検索クエリは100文字以内で入力してください";
pub const SEARCH_QUERY_FORBIDDEN: &str = "検索クエリに不正な文字が含まれています";

/// Characters rejected anywhere in a search query.
pub const SEARCH_QUERY_FORBIDDEN_CHARS: [char; 2] = [';', '%'];

/// Parses a path identifier.
///
/// Only ASCII decimal digits are accepted; signs, whitespace, the empty
/// string, zero, and values that overflow `i64` are rejected.
///
/// # Errors
///
/// Returns an `INVALID_INPUT` error naming `field`.
pub fn parse_id(field: &str, raw: &str) -> Result<i64, CatalogError> {
    if raw.is_empty() {
        return Err(CatalogError::invalid_input(
            field,
            format!("{field} is required"),
        ));
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CatalogError::invalid_input(
            field,
            format!("{field} must be a positive integer (got '{raw}')"),
        )
        .with_context("value", raw));
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(CatalogError::invalid_input(
            field,
            format!("{field} must be a positive integer (got '{raw}')"),
        )
        .with_context("value", raw)),
        Err(e) => Err(CatalogError::invalid_input(
            field,
            format!("{field} is out of range (got '{raw}')"),
        )
        .with_context("value", raw)
        .with_source(e)),
    }
}

/// Applies the search input policy and returns the trimmed query.
///
/// # Errors
///
/// Returns an `INVALID_INPUT` error carrying one of the fixed policy messages
/// when the query is blank, longer than [`SEARCH_QUERY_MAX_CHARS`], or
/// contains a forbidden character.
pub fn validate_search_query(raw: &str) -> Result<String, CatalogError> {
    let query: &str = raw.trim();
    if query.is_empty() {
        return Err(CatalogError::invalid_input("q", SEARCH_QUERY_REQUIRED));
    }
    if query.chars().count() > SEARCH_QUERY_MAX_CHARS {
        return Err(CatalogError::invalid_input("q", SEARCH_QUERY_TOO_LONG));
    }
    if query.contains(SEARCH_QUERY_FORBIDDEN_CHARS) {
        return Err(CatalogError::invalid_input("q", SEARCH_QUERY_FORBIDDEN));
    }
    Ok(query.to_string())
}

/// A search query that passed the input policy, trimmed and NFC-normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Validates `raw` with [`validate_search_query`] and normalises it.
    ///
    /// # Errors
    ///
    /// Returns the `INVALID_INPUT` error of [`validate_search_query`].
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        Ok(Self(normalize_nfc(&validate_search_query(raw)?)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unicode NFC normalisation used for search matching.
#[must_use]
pub fn normalize_nfc(value: &str) -> String {
    value.nfc().collect()
}

/// Case-sensitive substring match on NFC-normalised text.
#[must_use]
pub fn matches_query(haystack: &str, normalized_query: &str) -> bool {
    normalize_nfc(haystack).contains(normalized_query)
}
