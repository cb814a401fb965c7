// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation and Infrastructure Orchestration
//!
//! Builds, lints, and tests the workspace, and provides explicit, opt-in
//! validation of the `PostgreSQL` backend in addition to the default `SQLite`
//! backend.
//!
//! ### Backend Testing Commands
//!
//! - `cargo test`: Runs all standard tests against `SQLite` (fast, no infrastructure)
//! - `cargo xtask test-postgres`: Runs backend validation tests against `PostgreSQL`
//! - `cargo xtask verify-migrations`: Checks that `migrations/` and
//!   `migrations_postgres/` produce the same schema
//!
//! ### Implementation Details
//!
//! The `test-postgres` command:
//! - Orchestrates Docker container lifecycle (start, wait, stop, cleanup)
//! - Provisions a `PostgreSQL` 16 container with a test database
//! - Sets `DATABASE_URL` and `NYUSHI_TEST_BACKEND` for the tests
//! - Executes explicitly ignored tests via `--ignored` flag
//! - Guarantees cleanup even on test failure
//!
//! External databases are opt-in only; standard `cargo test` never needs
//! one.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Bool, Integer, Text};
use diesel::{PgConnection, QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Lint, build, and test the workspace
    CI,

    /// Build every target
    #[command(visible_alias = "b")]
    Build,

    /// Run clippy, rustdoc, and rustfmt checks
    #[command(visible_alias = "l")]
    Lint,

    /// Apply clippy suggestions
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Format the workspace
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run the `SQLite` test suite and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Run `PostgreSQL` backend validation tests
    #[command(visible_alias = "tp")]
    TestPostgres,

    /// Verify schema parity between `SQLite` and `PostgreSQL` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Lint => lint(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => run_cargo_nightly(vec!["fmt", "--all"]),
            Self::Test => test(),
            Self::TestPostgres => test_postgres(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Docker-backed checks stay opt-in; CI runs only what needs no services.
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()
}

fn build() -> Result<()> {
    run_cargo(vec!["build", "--workspace", "--all-targets"])
}

/// Clippy with warnings denied, docs with docs.rs flags, then rustfmt.
fn lint() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])?;
    lint_docs()?;
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--workspace",
        "--all-targets",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
    ])
}

/// Build the docs of every `nyushi-*` crate with warnings denied
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            ["doc", "--no-deps", "--package", &package.name],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// `SQLite`-only: the `PostgreSQL` tests are `#[ignore]`d
fn test() -> Result<()> {
    run_cargo(vec!["test", "--workspace", "--all-targets"])?;
    run_cargo(vec!["test", "--workspace", "--doc"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Name, credentials, and host port of a throwaway `PostgreSQL` container.
struct PostgresContainer {
    name: &'static str,
    db_name: &'static str,
    db_user: &'static str,
    db_password: &'static str,
    host_port: &'static str,
}

impl PostgresContainer {
    fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@127.0.0.1:{}/{}",
            self.db_user, self.db_password, self.host_port, self.db_name
        )
    }

    /// Start the container, replacing any leftover from an earlier run, and
    /// wait until it accepts connections.
    fn start(&self) -> Result<()> {
        use std::thread::sleep;
        use std::time::Duration;

        tracing::info!("Checking Docker availability");
        cmd!("docker", "--version")
            .run_with_trace()
            .wrap_err("Docker is not available. Please install Docker.")?;

        tracing::info!("Cleaning up any existing container");
        self.remove();

        tracing::info!("Starting PostgreSQL container: {}", self.name);
        cmd!(
            "docker",
            "run",
            "--name",
            self.name,
            "-e",
            format!("POSTGRES_DB={}", self.db_name),
            "-e",
            format!("POSTGRES_USER={}", self.db_user),
            "-e",
            format!("POSTGRES_PASSWORD={}", self.db_password),
            "-p",
            format!("{}:5432", self.host_port),
            "-d",
            "postgres:16"
        )
        .run_with_trace()
        .wrap_err("Failed to start PostgreSQL container")?;

        tracing::info!("Waiting for PostgreSQL to be ready...");
        let max_attempts = 30;
        for attempt in 1..=max_attempts {
            sleep(Duration::from_secs(1));
            tracing::debug!("Connection attempt {}/{}", attempt, max_attempts);

            let result = cmd!(
                "docker",
                "exec",
                self.name,
                "pg_isready",
                "-U",
                self.db_user,
                "-d",
                self.db_name
            )
            .stdout_null()
            .run();

            if result.is_ok() {
                tracing::info!("PostgreSQL is ready");
                return Ok(());
            }
        }

        self.remove();
        Err(color_eyre::eyre::eyre!(
            "PostgreSQL did not become ready within timeout"
        ))
    }

    fn remove(&self) {
        let _ = cmd!("docker", "stop", self.name).stdout_null().stderr_null().run();
        let _ = cmd!("docker", "rm", self.name).stdout_null().stderr_null().run();
    }
}

/// Run `PostgreSQL` backend validation tests
///
/// Explicit, opt-in validation of the production backend. Starts a
/// `PostgreSQL` 16 container on port 5433, points the ignored tests in
/// `nyushi-persistence` at it through `DATABASE_URL` and
/// `NYUSHI_TEST_BACKEND=postgres`, and removes the container afterwards.
///
/// ## What Gets Tested
///
/// - Migration application on `PostgreSQL`
/// - Foreign key constraint enforcement
/// - Partial unique index behavior
/// - Optimistic locking and cascading soft deletes
///
/// ## Usage
///
/// ```bash
/// cargo xtask test-postgres
/// ```
///
/// Container cleanup happens regardless of test outcome.
fn test_postgres() -> Result<()> {
    tracing::info!("Starting PostgreSQL backend validation");

    let container = PostgresContainer {
        name: "nyushi-test-postgres",
        db_name: "nyushi_test",
        db_user: "nyushi",
        db_password: "test_password",
        // Non-standard port to avoid clashing with a local server
        host_port: "5433",
    };
    container.start()?;

    // Filter to the backend_validation_tests module so ordinary tests stay out
    tracing::info!("Running PostgreSQL backend validation tests");
    let test_result = cmd!(
        "cargo",
        "test",
        "--package",
        "nyushi-persistence",
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.database_url())
    .env("NYUSHI_TEST_BACKEND", "postgres")
    .run_with_trace();

    tracing::info!("Stopping PostgreSQL container");
    container.remove();

    test_result.wrap_err("PostgreSQL backend validation tests failed")?;

    tracing::info!("PostgreSQL backend validation completed successfully");
    Ok(())
}

/// Verify schema parity between `SQLite` and `PostgreSQL` migrations
///
/// Applies `migrations/` to an in-memory `SQLite` database and
/// `migrations_postgres/` to a throwaway `PostgreSQL` container (port 5434),
/// introspects both, normalizes backend-specific types, and fails on any
/// structural difference in tables, columns, keys, or indexes.
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
///
/// Container cleanup happens regardless of outcome.
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    tracing::info!("Starting schema parity verification");

    let container = PostgresContainer {
        name: "nyushi-verify-migrations",
        db_name: "nyushi_verify",
        db_user: "nyushi",
        db_password: "verify_password",
        host_port: "5434",
    };
    container.start()?;

    let verification_result = (|| -> Result<()> {
        tracing::info!("Applying SQLite migrations");
        #[allow(clippy::items_after_statements)]
        const SQLITE_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
            embed_migrations!("../crates/persistence/migrations");

        let mut sqlite_conn = SqliteConnection::establish(":memory:")
            .wrap_err("Failed to create SQLite in-memory database")?;

        diesel::sql_query("PRAGMA foreign_keys = ON")
            .execute(&mut sqlite_conn)
            .wrap_err("Failed to enable foreign keys on SQLite")?;

        sqlite_conn
            .run_pending_migrations(SQLITE_MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;

        tracing::info!("Applying PostgreSQL migrations");
        #[allow(clippy::items_after_statements)]
        const POSTGRES_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
            embed_migrations!("../crates/persistence/migrations_postgres");

        let mut pg_conn = PgConnection::establish(&container.database_url())
            .wrap_err("Failed to connect to PostgreSQL")?;

        pg_conn
            .run_pending_migrations(POSTGRES_MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to apply PostgreSQL migrations: {}", e))?;

        tracing::info!("Introspecting schemas");
        let sqlite_schema = introspect_sqlite_schema(&mut sqlite_conn)?;
        let postgres_schema = introspect_postgres_schema(&mut pg_conn)?;

        tracing::info!("Comparing schemas");
        compare_schemas(&sqlite_schema, &postgres_schema)?;

        tracing::info!("✓ Schema parity verification passed");
        Ok(())
    })();

    container.remove();

    verification_result
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

/// Secondary index, compared by name, columns, and uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
    unique: bool,
}

/// Introspect `SQLite` schema
#[allow(clippy::too_many_lines)]
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table::default();

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            // SQLite reports INTEGER PRIMARY KEY as nullable; it never is
            let nullable = col.notnull == 0 && col.pk == 0;
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes
            .into_iter()
            .filter(|idx| !idx.name.starts_with("sqlite_autoindex_"))
        {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            table_info.indexes.insert(Index {
                name: idx.name,
                columns: index_columns.into_iter().map(|c| c.name).collect(),
                unique: idx.unique != 0,
            });
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Introspect `PostgreSQL` schema
#[allow(clippy::too_many_lines)]
fn introspect_postgres_schema(conn: &mut PgConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        table_name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        data_type: String,
        #[diesel(sql_type = Text)]
        is_nullable: String,
    }

    #[derive(QueryableByName)]
    struct KeyColumn {
        #[diesel(sql_type = Text)]
        column_name: String,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        foreign_table_name: String,
        #[diesel(sql_type = Text)]
        foreign_column_name: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumn {
        #[diesel(sql_type = Text)]
        index_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Bool)]
        is_unique: bool,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT table_name::text AS table_name FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
         AND table_name != '__diesel_schema_migrations' ORDER BY table_name",
    )
    .load(conn)
    .wrap_err("Failed to query PostgreSQL tables")?;

    for table in tables {
        let mut table_info = Table::default();

        let columns: Vec<ColumnInfo> = diesel::sql_query(
            "SELECT column_name::text AS column_name, data_type::text AS data_type, \
             is_nullable::text AS is_nullable FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!("Failed to get columns for table {}", table.table_name))?;

        for col in columns {
            table_info.columns.insert(
                col.column_name,
                Column {
                    normalized_type: normalize_postgres_type(&col.data_type),
                    nullable: col.is_nullable == "YES",
                },
            );
        }

        let primary_keys: Vec<KeyColumn> = diesel::sql_query(
            "SELECT kcu.column_name::text AS column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
              AND tc.table_schema = kcu.table_schema \
             WHERE tc.table_schema = 'public' AND tc.table_name = $1 \
               AND tc.constraint_type = 'PRIMARY KEY'",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!(
            "Failed to get primary keys for table {}",
            table.table_name
        ))?;
        table_info.primary_keys = primary_keys.into_iter().map(|k| k.column_name).collect();

        let fks: Vec<ForeignKeyInfo> = diesel::sql_query(
            "SELECT kcu.column_name::text AS column_name, \
                    ccu.table_name::text AS foreign_table_name, \
                    ccu.column_name::text AS foreign_column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
              AND tc.table_schema = kcu.table_schema \
             JOIN information_schema.constraint_column_usage ccu \
               ON tc.constraint_name = ccu.constraint_name \
              AND tc.table_schema = ccu.table_schema \
             WHERE tc.table_schema = 'public' AND tc.table_name = $1 \
               AND tc.constraint_type = 'FOREIGN KEY'",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!(
            "Failed to get foreign keys for table {}",
            table.table_name
        ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.column_name,
                to_table: fk.foreign_table_name,
                to_column: fk.foreign_column_name,
            });
        }

        // Primary key indexes are covered by primary_keys above
        let index_columns: Vec<IndexColumn> = diesel::sql_query(
            "SELECT ic.relname::text AS index_name, a.attname::text AS column_name, \
                    ix.indisunique AS is_unique \
             FROM pg_index ix \
             JOIN pg_class t ON t.oid = ix.indrelid \
             JOIN pg_class ic ON ic.oid = ix.indexrelid \
             JOIN pg_namespace n ON n.oid = t.relnamespace \
             JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) ON true \
             JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
             WHERE n.nspname = 'public' AND t.relname = $1 AND NOT ix.indisprimary \
             ORDER BY ic.relname, k.ord",
        )
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!("Failed to get indexes for table {}", table.table_name))?;

        let mut indexes: BTreeMap<String, Index> = BTreeMap::new();
        for row in index_columns {
            indexes
                .entry(row.index_name.clone())
                .or_insert_with(|| Index {
                    name: row.index_name,
                    columns: Vec::new(),
                    unique: row.is_unique,
                })
                .columns
                .push(row.column_name);
        }
        table_info.indexes = indexes.into_values().collect();

        schema.tables.insert(table.table_name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Normalize `PostgreSQL` type to common representation
#[allow(clippy::match_same_arms)]
fn normalize_postgres_type(postgres_type: &str) -> String {
    match postgres_type.to_lowercase().as_str() {
        "smallint" | "integer" | "bigint" => "integer".to_string(),
        "real" | "double precision" | "numeric" => "real".to_string(),
        "bytea" => "blob".to_string(),
        _ => "text".to_string(),
    }
}

/// Compare schemas and fail on mismatch
#[allow(clippy::too_many_lines)]
fn compare_schemas(sqlite_schema: &Schema, postgres_schema: &Schema) -> Result<()> {
    let sqlite_tables: BTreeSet<_> = sqlite_schema.tables.keys().collect();
    let postgres_tables: BTreeSet<_> = postgres_schema.tables.keys().collect();

    if sqlite_tables != postgres_tables {
        let mut errors = Vec::new();

        for table in sqlite_tables.difference(&postgres_tables) {
            errors.push(format!(
                "  - Table '{table}' exists in SQLite but not in PostgreSQL"
            ));
        }

        for table in postgres_tables.difference(&sqlite_tables) {
            errors.push(format!(
                "  - Table '{table}' exists in PostgreSQL but not in SQLite"
            ));
        }

        return Err(color_eyre::eyre::eyre!(
            "❌ Schema parity check FAILED: Table mismatch\n{}",
            errors.join("\n")
        ));
    }

    for table_name in sqlite_tables {
        let sqlite_table = &sqlite_schema.tables[table_name];
        let postgres_table = &postgres_schema.tables[table_name];

        let sqlite_columns: BTreeSet<_> = sqlite_table.columns.keys().collect();
        let postgres_columns: BTreeSet<_> = postgres_table.columns.keys().collect();

        if sqlite_columns != postgres_columns {
            let mut errors = Vec::new();

            for col in sqlite_columns.difference(&postgres_columns) {
                errors.push(format!(
                    "    - Column '{col}' exists in SQLite but not in PostgreSQL"
                ));
            }

            for col in postgres_columns.difference(&sqlite_columns) {
                errors.push(format!(
                    "    - Column '{col}' exists in PostgreSQL but not in SQLite"
                ));
            }

            return Err(color_eyre::eyre::eyre!(
                "❌ Schema parity check FAILED: Column mismatch in table '{}'\n{}",
                table_name,
                errors.join("\n")
            ));
        }

        for col_name in sqlite_columns {
            let sqlite_col = &sqlite_table.columns[col_name];
            let postgres_col = &postgres_table.columns[col_name];

            if sqlite_col != postgres_col {
                return Err(color_eyre::eyre::eyre!(
                    "❌ Schema parity check FAILED: Column definition mismatch in table '{}', column '{}'\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                    table_name,
                    col_name,
                    sqlite_col,
                    postgres_col
                ));
            }
        }

        if sqlite_table.primary_keys != postgres_table.primary_keys {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema parity check FAILED: Primary key mismatch in table '{}'\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                table_name,
                sqlite_table.primary_keys,
                postgres_table.primary_keys
            ));
        }

        if sqlite_table.foreign_keys != postgres_table.foreign_keys {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema parity check FAILED: Foreign key mismatch in table '{}'\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                table_name,
                sqlite_table.foreign_keys,
                postgres_table.foreign_keys
            ));
        }

        if sqlite_table.indexes != postgres_table.indexes {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema parity check FAILED: Index mismatch in table '{}'\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                table_name,
                sqlite_table.indexes,
                postgres_table.indexes
            ));
        }
    }

    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
