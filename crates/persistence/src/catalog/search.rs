// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog search.

use std::collections::BTreeSet;

use nyushi_domain::{University, matches_query};
use tracing::debug;

use super::tree::load_universities;
use crate::error::PersistenceError;
use crate::store::CatalogStore;

/// Universities whose own name, or the name of any live department or major
/// below them, contains `normalized_query`.
///
/// `normalized_query` must already be validated and NFC-normalised. Each
/// match is returned once with its full, unfiltered tree.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn search<C: CatalogStore>(
    conn: &mut C,
    normalized_query: &str,
) -> Result<Vec<University>, PersistenceError> {
    let mut matched: BTreeSet<i64> = BTreeSet::new();
    let names: Vec<(i64, String)> = conn
        .university_names()?
        .into_iter()
        .chain(conn.department_names()?)
        .chain(conn.major_names()?)
        .collect();
    for (university_id, name) in &names {
        if matches_query(name, normalized_query) {
            matched.insert(*university_id);
        }
    }
    debug!(query = normalized_query, matches = matched.len(), "Search matched");
    let ids: Vec<i64> = matched.into_iter().collect();
    load_universities(conn, &ids)
}
