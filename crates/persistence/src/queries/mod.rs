// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for the persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//! Every query skips soft-deleted rows.
//!
//! ## Module Organization
//!
//! - `tree`: Level-by-level loads used to assemble university trees
//! - `lookup`: Single-row lookups by identifier
//! - `search`: Name projections scanned by catalog search
//!
//! ## Backend-Specific Functions
//!
//! All query functions are generated in backend-specific monomorphic versions:
//! - Functions suffixed with `_sqlite` for `SQLite`
//! - Functions suffixed with `_pg` for `PostgreSQL`
//!
//! Composite operations reach them through `store::CatalogStore`.

pub mod lookup;
pub mod search;
pub mod tree;

pub use lookup::*;
pub use search::*;
pub use tree::*;
