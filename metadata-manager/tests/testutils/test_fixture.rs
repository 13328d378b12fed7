//! Test fixture for metadata-manager integration tests
//!
//! Uses ONLY the public crate API.

#![allow(dead_code)]

use metadata_manager::{
    CatalogConfig, CatalogManager, Column, DataTypeId, ErrorCode, ObjectId, Status, Table,
};
use std::path::Path;

/// Connection string of the PostgreSQL test database; PostgreSQL tests are
/// skipped when unset
pub const PG_ENV: &str = "METADATA_MANAGER_TEST_PG";

/// Catalog over an isolated metadata store
pub struct TestFixture {
    catalog: CatalogManager,
    config: CatalogConfig,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestFixture {
    /// Catalog over a fresh JSON metadata file
    pub fn json() -> Result<Self, Box<dyn std::error::Error>> {
        init_logging();
        let temp_dir = tempfile::tempdir()?;
        let config = CatalogConfig::json(temp_dir.path());
        let catalog = CatalogManager::new(&config)?;
        Ok(Self {
            catalog,
            config,
            _temp_dir: Some(temp_dir),
        })
    }

    /// Catalog over the PostgreSQL test database, if one is configured
    ///
    /// Installs the catalog schema first; installation is idempotent.
    pub fn postgresql() -> Option<Self> {
        init_logging();
        let conn = std::env::var(PG_ENV).ok().filter(|v| !v.is_empty())?;
        let config = CatalogConfig::postgresql(conn);
        install_schema(&config);
        let catalog = CatalogManager::new(&config).expect("Failed to open PostgreSQL catalog");
        Some(Self {
            catalog,
            config,
            _temp_dir: None,
        })
    }

    pub fn catalog(&self) -> &CatalogManager {
        &self.catalog
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Directory holding the JSON metadata file
    pub fn metadata_dir(&self) -> &Path {
        &self.config.json.metadata_dir
    }

    /// A second, independent catalog manager over the same store
    pub fn reopen(&self) -> CatalogManager {
        CatalogManager::new(&self.config).expect("Failed to reopen catalog")
    }

    /// Add a table with `columns` INT64 columns and return its id
    pub fn add_simple_table(&self, name: &str, columns: i64) -> ObjectId {
        let table = simple_table(name, columns);
        let (id, status) = self.catalog.tables().add_table(&table);
        assert_ok(&status);
        id.expect("add_table returned no id")
    }
}

#[cfg(feature = "postgresql")]
fn install_schema(config: &CatalogConfig) {
    metadata_manager::session::PgConnector::new(&config.postgresql)
        .install_schema()
        .expect("Failed to install catalog schema");
}

#[cfg(not(feature = "postgresql"))]
fn install_schema(_config: &CatalogConfig) {
    panic!("{} is set but the postgresql feature is disabled", PG_ENV);
}

/// A table named `name` with columns `c1..cN`
pub fn simple_table(name: &str, columns: i64) -> Table {
    (1..=columns).fold(Table::new(name), |table, n| {
        table.with_column(Column::new(format!("c{}", n), n, DataTypeId::Int64.id()))
    })
}

/// Unique object name for test isolation on shared stores
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, fastrand::u64(..))
}

pub fn assert_ok(status: &Status) {
    assert!(status.is_ok(), "unexpected status: {}", status);
}

pub fn assert_code(status: &Status, code: ErrorCode) {
    assert_eq!(status.code(), code, "unexpected status: {}", status);
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
