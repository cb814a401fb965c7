// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Nyushi admissions catalog.
//!
//! This crate stores the University → Department → Major →
//! `AdmissionSchedule` → {`AdmissionInfo`, `TestType` → Subject} hierarchy,
//! enforces the catalog invariants inside single transactions, and memoizes
//! the hot read paths in an in-process TTL cache. It is built on Diesel and
//! supports two database backends.
//!
//! ## Database Backend Support
//!
//! - **`SQLite`**: development, unit tests, and integration tests. Each
//!   in-memory instance is isolated per test.
//! - **`PostgreSQL`**: production. Validated via explicit opt-in tests:
//!
//! ```bash
//! cargo xtask test-postgres
//! ```
//!
//! ### Migration Strategy
//!
//! Due to `SQL` syntax differences between backends, we maintain separate
//! migration directories:
//!
//! - `migrations/`: `SQLite`-specific
//! - `migrations_postgres/`: `PostgreSQL`-specific
//!
//! Both produce identical schema semantics but use backend-appropriate syntax.
//!
//! ## Transactions, Deadlines, and Retries
//!
//! Every public operation takes a [`Deadline`]. Pool checkout waits at most
//! the remaining time, and each transaction bounds its statements by it
//! (`statement_timeout` on `PostgreSQL`, `busy_timeout` on `SQLite`). Writes
//! run in one transaction that is retried on deadlock following
//! [`DEADLOCK_BACKOFF`]. A successful write clears the read cache.
//!
//! ## Testing Philosophy
//!
//! - Standard tests (`cargo test`) run against `SQLite` only
//! - Backend validation tests are explicitly marked `#[ignore]`
//! - All infrastructure is orchestrated by `xtask`, not embedded in tests

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::r2d2::{ConnectionManager, Pool, PooledConnection, R2D2Connection};
use diesel::{PgConnection, SqliteConnection};
use nyushi_domain::{
    AdmissionInfo, AdmissionSchedule, CatalogError, Department, Entity, Major, Subject, TestType,
    SearchQuery, University,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Macro to generate monomorphic backend-specific query/mutation functions.
///
/// This macro generates two separate functions from a single function body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_pg` taking `&mut PgConnection`
///
/// Diesel needs concrete backend types at compile time, so leaf queries are
/// written once and stamped out per backend. Code that composes several
/// leaves goes through the [`store::CatalogStore`] trait instead.
///
/// # Usage
///
/// ```ignore
/// backend_fn! {
///     pub fn my_query(conn: &mut _, param: i64) -> Result<String, PersistenceError> {
///         diesel_schema::table::table
///             .filter(diesel_schema::table::id.eq(param))
///             .first::<String>(conn)
///             .map_err(Into::into)
///     }
/// }
/// ```
///
/// This generates:
/// - `my_query_sqlite(&mut SqliteConnection, i64) -> Result<String, PersistenceError>`
/// - `my_query_pg(&mut PgConnection, i64) -> Result<String, PersistenceError>`
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            // Generate SQLite version
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            // Generate PostgreSQL version
            $(#[$meta])*
            $vis fn [<$name _pg>] (
                $conn: &mut PgConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

/// Checks out a pooled connection and runs `$body` with it bound to `$conn`.
///
/// Each arm type-checks `$body` against its own concrete connection type.
macro_rules! with_connection {
    ($self:ident, $deadline:ident, |$conn:ident| $body:expr) => {
        match &$self.pool {
            BackendPool::Sqlite(pool) => checkout(pool, $deadline).and_then(|mut pooled| {
                let $conn: &mut SqliteConnection = &mut pooled;
                $body
            }),
            BackendPool::Postgres(pool) => checkout(pool, $deadline).and_then(|mut pooled| {
                let $conn: &mut PgConnection = &mut pooled;
                $body
            }),
        }
    };
}

/// Runs `$body` in a read transaction, retrying on deadlock.
macro_rules! read_op {
    ($self:ident, $deadline:ident, $operation:expr, $table:expr, |$conn:ident| $body:expr) => {
        with_connection!($self, $deadline, |$conn| {
            with_deadlock_retry($operation, $deadline, || {
                $conn.read_transaction(|$conn| {
                    $conn.apply_deadline($deadline)?;
                    $body
                })
            })
        })
        .map_err(|e| e.into_catalog($operation, $table))
    };
}

/// Runs `$body` in a write transaction, retrying on deadlock, and clears
/// the read cache after a successful commit.
macro_rules! write_op {
    ($self:ident, $deadline:ident, $operation:expr, $table:expr, |$conn:ident| $body:expr) => {{
        let result = with_connection!($self, $deadline, |$conn| {
            with_deadlock_retry($operation, $deadline, || {
                $conn.write_transaction(|$conn| {
                    $conn.apply_deadline($deadline)?;
                    let outcome: Result<_, PersistenceError> = $body;
                    let value = outcome?;
                    // An expired write rolls back rather than committing unseen.
                    $deadline.check($operation)?;
                    Ok(value)
                })
            })
        });
        match result {
            Ok(value) => {
                $self.cache.clear();
                Ok(value)
            }
            Err(e) => Err(e.into_catalog($operation, $table)),
        }
    }};
}

mod backend;
mod cache;
mod catalog;
mod data_models;
mod deadline;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use backend::PoolSettings;
pub use backend::postgres::connection_url as postgres_url;
pub use cache::{
    ALL_UNIVERSITIES_KEY, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL, SweeperHandle, TtlCache,
    search_key, spawn_sweeper,
};
pub use deadline::{DEADLOCK_BACKOFF, DEFAULT_REQUEST_TIMEOUT, Deadline, with_deadlock_retry};
pub use error::PersistenceError;

use backend::PersistenceBackend;
use backend::postgres::PgPool;
use backend::sqlite::SqlitePool;
use store::CatalogStore;

/// Cache of materialised university lists, keyed by [`ALL_UNIVERSITIES_KEY`]
/// and [`search_key`].
pub type CatalogCache = TtlCache<Arc<Vec<University>>>;

/// Pool over the backend selected at construction time.
enum BackendPool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub backend: &'static str,
    pub cached_entries: usize,
}

fn checkout<C>(
    pool: &Pool<ConnectionManager<C>>,
    deadline: &Deadline,
) -> Result<PooledConnection<ConnectionManager<C>>, PersistenceError>
where
    C: R2D2Connection + 'static,
{
    deadline.check("connection checkout")?;
    Ok(pool.get_timeout(deadline.remaining())?)
}

/// The catalog repository.
///
/// Shared across requests; every method takes `&self` and checks a pooled
/// connection out for the duration of the call. Methods block and are meant
/// to run on a blocking-capable thread.
pub struct Persistence {
    pool: BackendPool,
    cache: Arc<CatalogCache>,
}

impl Persistence {
    /// Creates a repository over a fresh in-memory `SQLite` database with a
    /// default cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        Self::new_in_memory_with_cache(Arc::new(CatalogCache::default()))
    }

    /// Creates a repository over a fresh in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory_with_cache(cache: Arc<CatalogCache>) -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_nyushi_{db_id}?mode=memory&cache=shared");
        let pool: SqlitePool = backend::sqlite::initialize_memory_pool(&shared_memory_url)?;
        Ok(Self {
            pool: BackendPool::Sqlite(pool),
            cache,
        })
    }

    /// Creates a repository over a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(
        path: P,
        settings: PoolSettings,
        cache: Arc<CatalogCache>,
    ) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::DatabaseConnectionFailed("Invalid database path".to_string())
        })?;
        let pool: SqlitePool = backend::sqlite::initialize_file_pool(path_str, settings)?;
        Ok(Self {
            pool: BackendPool::Sqlite(pool),
            cache,
        })
    }

    /// Creates a repository over a `PostgreSQL` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or migrated.
    pub fn new_with_postgres(
        database_url: &str,
        settings: PoolSettings,
        cache: Arc<CatalogCache>,
    ) -> Result<Self, PersistenceError> {
        let pool: PgPool = backend::postgres::initialize_pool(database_url, settings)?;
        Ok(Self {
            pool: BackendPool::Postgres(pool),
            cache,
        })
    }

    /// Caches a read unless a write cleared the cache while it ran.
    fn remember(
        &self,
        generation: u64,
        key: String,
        universities: Vec<University>,
    ) -> Vec<University> {
        let shared: Arc<Vec<University>> = Arc::new(universities);
        if !self
            .cache
            .set_if_current(generation, key.as_str(), Arc::clone(&shared))
        {
            debug!(key = %key, "Skipped caching a read that raced a write");
        }
        Arc::unwrap_or_clone(shared)
    }

    /// The cache shared with the sweeper.
    #[must_use]
    pub const fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Short name of the active backend.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self.pool {
            BackendPool::Sqlite(_) => SqliteConnection::NAME,
            BackendPool::Postgres(_) => PgConnection::NAME,
        }
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&self) -> Result<(), PersistenceError> {
        let deadline: Deadline = Deadline::default_request();
        let deadline: &Deadline = &deadline;
        with_connection!(self, deadline, |conn| conn.verify_foreign_key_enforcement())
    }

    /// Round-trips a trivial statement.
    ///
    /// # Errors
    ///
    /// Returns a database or timeout error when the backend is unreachable.
    pub fn ping(&self, deadline: &Deadline) -> Result<HealthReport, CatalogError> {
        read_op!(self, deadline, "ping", University::TABLE, |conn| CatalogStore::ping(conn))?;
        Ok(HealthReport {
            status: "ok",
            backend: self.backend_name(),
            cached_entries: self.cache.len(),
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Every live university with its full tree, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns a database or timeout error.
    pub fn find_all(&self, deadline: &Deadline) -> Result<Vec<University>, CatalogError> {
        if let Some(hit) = self.cache.get(ALL_UNIVERSITIES_KEY) {
            debug!(key = ALL_UNIVERSITIES_KEY, "Cache hit");
            return Ok(hit.as_ref().clone());
        }
        let generation: u64 = self.cache.generation();
        let universities: Vec<University> =
            read_op!(self, deadline, "find_all", University::TABLE, |conn| {
                catalog::load_all(conn)
            })?;
        Ok(self.remember(generation, ALL_UNIVERSITIES_KEY.to_string(), universities))
    }

    /// One live university with its full tree.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` if the university does not exist or was deleted.
    pub fn find_by_id(&self, id: i64, deadline: &Deadline) -> Result<University, CatalogError> {
        read_op!(self, deadline, "find_by_id", University::TABLE, |conn| {
            catalog::load_university(conn, id)
        })
    }

    /// Universities whose name, or any live department or major name,
    /// contains `raw_query`.
    ///
    /// The query is parsed into a [`SearchQuery`] first; see
    /// [`Persistence::search_query`].
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a query that breaks the input policy, or a
    /// database or timeout error.
    pub fn search(
        &self,
        raw_query: &str,
        deadline: &Deadline,
    ) -> Result<Vec<University>, CatalogError> {
        self.search_query(&SearchQuery::parse(raw_query)?, deadline)
    }

    /// Universities matching an already parsed `query`, returned whole and
    /// ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns a database or timeout error.
    pub fn search_query(
        &self,
        query: &SearchQuery,
        deadline: &Deadline,
    ) -> Result<Vec<University>, CatalogError> {
        let key: String = search_key(query.as_str());
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(hit.as_ref().clone());
        }
        let generation: u64 = self.cache.generation();
        let universities: Vec<University> =
            read_op!(self, deadline, "search", University::TABLE, |conn| {
                catalog::search(conn, query.as_str())
            })?;
        Ok(self.remember(generation, key, universities))
    }

    /// The bare department `department_id` of `university_id`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the department is live and belongs to the
    /// university.
    pub fn find_department(
        &self,
        university_id: i64,
        department_id: i64,
        deadline: &Deadline,
    ) -> Result<Department, CatalogError> {
        read_op!(self, deadline, "find_department", Department::TABLE, |conn| {
            catalog::department_under(conn, university_id, department_id)?.into_entity()
        })
    }

    /// The bare major `major_id` of `department_id`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the major is live and belongs to the
    /// department.
    pub fn find_major(
        &self,
        department_id: i64,
        major_id: i64,
        deadline: &Deadline,
    ) -> Result<Major, CatalogError> {
        read_op!(self, deadline, "find_major", Major::TABLE, |conn| {
            catalog::major_under(conn, department_id, major_id)?.into_entity()
        })
    }

    /// The bare admission schedule `schedule_id` of `major_id`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the schedule is live and belongs to the
    /// major.
    pub fn find_admission_schedule(
        &self,
        major_id: i64,
        schedule_id: i64,
        deadline: &Deadline,
    ) -> Result<AdmissionSchedule, CatalogError> {
        read_op!(
            self,
            deadline,
            "find_admission_schedule",
            AdmissionSchedule::TABLE,
            |conn| catalog::schedule_under(conn, major_id, schedule_id)?.into_entity()
        )
    }

    /// The subject `subject_id`, provided it sits anywhere below
    /// `department_id`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the subject is live and descends from the
    /// department.
    pub fn find_subject(
        &self,
        department_id: i64,
        subject_id: i64,
        deadline: &Deadline,
    ) -> Result<Subject, CatalogError> {
        read_op!(self, deadline, "find_subject", Subject::TABLE, |conn| {
            catalog::subject_under(conn, department_id, subject_id)?
                .subject
                .into_entity()
        })
    }

    /// The admission info `info_id` of `schedule_id`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the info is live and belongs to the
    /// schedule.
    pub fn find_admission_info(
        &self,
        schedule_id: i64,
        info_id: i64,
        deadline: &Deadline,
    ) -> Result<AdmissionInfo, CatalogError> {
        read_op!(
            self,
            deadline,
            "find_admission_info",
            AdmissionInfo::TABLE,
            |conn| catalog::admission_info_under(conn, schedule_id, info_id)?.into_entity()
        )
    }

    /// The test type `test_type_id` with its subjects, provided it sits below
    /// `department_id`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the test type is live and descends from the
    /// department.
    pub fn find_test_type(
        &self,
        department_id: i64,
        test_type_id: i64,
        deadline: &Deadline,
    ) -> Result<TestType, CatalogError> {
        read_op!(self, deadline, "find_test_type", TestType::TABLE, |conn| {
            let lineage = catalog::test_type_under(conn, department_id, test_type_id)?;
            catalog::load_test_type(conn, lineage.test_type)
        })
    }

    // ========================================================================
    // University writes
    // ========================================================================

    /// Persists `university` and its whole tree.
    ///
    /// Identifiers on the input are ignored. Omitted schedule and subject
    /// display orders are derived, and subject percentages are recomputed
    /// before the tree check runs.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR`, `INVALID_YEAR`, or `DUPLICATE_KEY` when the
    /// tree breaks a catalog rule; nothing is stored in that case.
    pub fn create_university(
        &self,
        university: &University,
        deadline: &Deadline,
    ) -> Result<University, CatalogError> {
        let created: University =
            write_op!(self, deadline, "create", University::TABLE, |conn| {
                catalog::create_university(conn, deadline, university)
            })?;
        info!(id = ?created.id(), name = %created.name, "Created university");
        Ok(created)
    }

    /// Renames university `id`. `changes.version` must match the stored
    /// version.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND`, a `stale_version` validation error, or a field
    /// validation error.
    pub fn update_university(
        &self,
        id: i64,
        changes: &University,
        deadline: &Deadline,
    ) -> Result<University, CatalogError> {
        write_op!(self, deadline, "update", University::TABLE, |conn| {
            catalog::update_university(conn, id, changes)
        })
    }

    /// Soft-deletes university `id` and every descendant.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` if the university is not live.
    pub fn delete_university(&self, id: i64, deadline: &Deadline) -> Result<(), CatalogError> {
        write_op!(self, deadline, "delete", University::TABLE, |conn| {
            catalog::delete_university(conn, id)
        })
    }

    // ========================================================================
    // Department writes
    // ========================================================================

    /// Adds `department`, with any subtree it carries, to university
    /// `university_id`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` for a missing university, or a validation error.
    pub fn create_department(
        &self,
        university_id: i64,
        department: &Department,
        deadline: &Deadline,
    ) -> Result<Department, CatalogError> {
        write_op!(self, deadline, "create", Department::TABLE, |conn| {
            catalog::create_department(conn, deadline, university_id, department)
        })
    }

    /// Renames a department.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND`, `stale_version`, or a field validation error.
    pub fn update_department(
        &self,
        university_id: i64,
        department_id: i64,
        changes: &Department,
        deadline: &Deadline,
    ) -> Result<Department, CatalogError> {
        write_op!(self, deadline, "update", Department::TABLE, |conn| {
            catalog::update_department(conn, university_id, department_id, changes)
        })
    }

    /// Soft-deletes a department and its descendants.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the department is live under the university.
    pub fn delete_department(
        &self,
        university_id: i64,
        department_id: i64,
        deadline: &Deadline,
    ) -> Result<(), CatalogError> {
        write_op!(self, deadline, "delete", Department::TABLE, |conn| {
            catalog::delete_department(conn, university_id, department_id)
        })
    }

    // ========================================================================
    // Major writes
    // ========================================================================

    /// Adds `major`, with any subtree it carries, to a department.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` for a missing parent, or a validation error.
    pub fn create_major(
        &self,
        university_id: i64,
        department_id: i64,
        major: &Major,
        deadline: &Deadline,
    ) -> Result<Major, CatalogError> {
        write_op!(self, deadline, "create", Major::TABLE, |conn| {
            catalog::create_major(conn, deadline, university_id, department_id, major)
        })
    }

    /// Renames a major.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND`, `stale_version`, or a field validation error.
    pub fn update_major(
        &self,
        university_id: i64,
        department_id: i64,
        major_id: i64,
        changes: &Major,
        deadline: &Deadline,
    ) -> Result<Major, CatalogError> {
        write_op!(self, deadline, "update", Major::TABLE, |conn| {
            catalog::update_major(conn, university_id, department_id, major_id, changes)
        })
    }

    /// Soft-deletes a major and its descendants.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the major is live under the department.
    pub fn delete_major(
        &self,
        university_id: i64,
        department_id: i64,
        major_id: i64,
        deadline: &Deadline,
    ) -> Result<(), CatalogError> {
        write_op!(self, deadline, "delete", Major::TABLE, |conn| {
            catalog::delete_major(conn, university_id, department_id, major_id)
        })
    }

    // ========================================================================
    // Schedule and admission info writes
    // ========================================================================

    /// Changes the round name and display order of a schedule.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND`, `stale_version`, `DUPLICATE_KEY` when another
    /// schedule of the major holds the name or order, or a validation error.
    pub fn update_admission_schedule(
        &self,
        path: SchedulePath,
        changes: &AdmissionSchedule,
        deadline: &Deadline,
    ) -> Result<AdmissionSchedule, CatalogError> {
        write_op!(self, deadline, "update", AdmissionSchedule::TABLE, |conn| {
            catalog::update_admission_schedule(conn, path, changes)
        })
    }

    /// Adds an admission info to a schedule.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_YEAR` for a year outside [2000, 2100],
    /// `VALIDATION_ERROR` for a bad validity window, or `NOT_FOUND`.
    pub fn create_admission_info(
        &self,
        path: SchedulePath,
        info: &AdmissionInfo,
        deadline: &Deadline,
    ) -> Result<AdmissionInfo, CatalogError> {
        write_op!(self, deadline, "create", AdmissionInfo::TABLE, |conn| {
            catalog::create_admission_info(conn, path, info)
        })
    }

    /// Replaces the fields of an admission info. Status changes must follow
    /// the publication lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND`, `stale_version`, `invalid_status_transition`, or a
    /// field validation error.
    pub fn update_admission_info(
        &self,
        path: SchedulePath,
        info_id: i64,
        changes: &AdmissionInfo,
        deadline: &Deadline,
    ) -> Result<AdmissionInfo, CatalogError> {
        write_op!(self, deadline, "update", AdmissionInfo::TABLE, |conn| {
            catalog::update_admission_info(conn, path, info_id, changes)
        })
    }

    /// Soft-deletes an admission info.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the info is live under the schedule.
    pub fn delete_admission_info(
        &self,
        path: SchedulePath,
        info_id: i64,
        deadline: &Deadline,
    ) -> Result<(), CatalogError> {
        write_op!(self, deadline, "delete", AdmissionInfo::TABLE, |conn| {
            catalog::delete_admission_info(conn, path, info_id)
        })
    }

    // ========================================================================
    // Subject writes
    // ========================================================================

    /// Adds `subject` to the test type named by `subject.test_type_id`, which
    /// must sit below the department. Percentages of the whole test type are
    /// recomputed.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` without a test type, `NOT_FOUND`,
    /// `DUPLICATE_KEY` for a taken display order, or a validation error.
    pub fn create_subject(
        &self,
        university_id: i64,
        department_id: i64,
        subject: &Subject,
        deadline: &Deadline,
    ) -> Result<Subject, CatalogError> {
        write_op!(self, deadline, "create", Subject::TABLE, |conn| {
            catalog::create_subject(conn, university_id, department_id, subject)
        })
    }

    /// Changes name, score, or display order of a subject and recomputes the
    /// percentages of its test type.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND`, `stale_version`, `DUPLICATE_KEY`, or a validation
    /// error.
    pub fn update_subject(
        &self,
        university_id: i64,
        department_id: i64,
        subject_id: i64,
        changes: &Subject,
        deadline: &Deadline,
    ) -> Result<Subject, CatalogError> {
        write_op!(self, deadline, "update", Subject::TABLE, |conn| {
            catalog::update_subject(conn, university_id, department_id, subject_id, changes)
        })
    }

    /// Soft-deletes a subject and recomputes the percentages of the rest.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` unless the subject is live below the department.
    pub fn delete_subject(
        &self,
        university_id: i64,
        department_id: i64,
        subject_id: i64,
        deadline: &Deadline,
    ) -> Result<(), CatalogError> {
        write_op!(self, deadline, "delete", Subject::TABLE, |conn| {
            catalog::delete_subject(conn, university_id, department_id, subject_id)
        })
    }

    /// Replaces the subject set of a test type in one transaction.
    ///
    /// Incoming subjects are matched to live ones by identifier, then by
    /// name. Matched subjects are updated, unmatched incoming ones inserted,
    /// and live subjects left unmatched soft-deleted. Missing display orders
    /// are assigned by position.
    ///
    /// # Errors
    ///
    /// Returns the first failing subject's validation error, `NOT_FOUND`, or
    /// `DUPLICATE_KEY`; nothing is stored in that case.
    pub fn update_subjects_batch(
        &self,
        university_id: i64,
        department_id: i64,
        test_type_id: i64,
        subjects: &[Subject],
        deadline: &Deadline,
    ) -> Result<TestType, CatalogError> {
        let test_type: TestType =
            write_op!(self, deadline, "batch_update", Subject::TABLE, |conn| {
                catalog::replace_subjects(
                    conn,
                    deadline,
                    university_id,
                    department_id,
                    test_type_id,
                    subjects,
                )
            })?;
        info!(
            test_type_id,
            subjects = test_type.subjects.len(),
            "Replaced subject set"
        );
        Ok(test_type)
    }
}

/// Full path to an admission schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePath {
    pub university_id: i64,
    pub department_id: i64,
    pub major_id: i64,
    pub schedule_id: i64,
}
