// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! This module contains all state-changing statements for the persistence
//! layer. Each one is a single statement; transactions, validation and
//! cascading are composed on top of them in `catalog`.
//!
//! ## Module Organization
//!
//! - `insert`: Row inserts returning the assigned identifier
//! - `update`: Version-guarded updates and subject bookkeeping
//! - `soft_delete`: Bulk soft deletion by identifier
//!
//! ## Version Guards
//!
//! Versioned updates match on `id`, `version` and `deleted_at IS NULL` at
//! once and increment `version` in the same statement. They return the
//! number of rows affected; zero means the row is missing, deleted, or was
//! changed concurrently, and the caller decides which.

pub mod insert;
pub mod soft_delete;
pub mod update;

pub use insert::*;
pub use soft_delete::*;
pub use update::*;
