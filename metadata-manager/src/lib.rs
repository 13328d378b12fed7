// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Metadata Manager - catalog storage for the Tsurugi database engine
//!
//! Stores and serves structural metadata (tables, columns, constraints,
//! indexes, data types, roles, privileges and statistics) on behalf of a
//! database engine, backed interchangeably by PostgreSQL or a JSON document
//! on disk.
//!
//! # Layers
//!
//! - **Providers** ([`provider`]): one per metadata kind; each operation is
//!   one transaction and answers `(Option<T>, Status)`
//! - **Sessions** ([`session`]): pooled backend connections with explicit
//!   `start_transaction`/`commit`/`rollback`
//! - **DAOs** ([`dao`]): per kind and backend, driven by a shared field
//!   schema so both backends store identical values
//! - **Messages** ([`message`]): message ids, [`Status`] and the broker that
//!   logs messages and forwards them to subscribed receivers
//!
//! # Usage
//!
//! ```no_run
//! use metadata_manager::{CatalogConfig, CatalogManager, Column, DataTypeId, Table};
//! use serde_json::json;
//!
//! let catalog = CatalogManager::new(&CatalogConfig::json("./metadata")).unwrap();
//! let table = Table::new("orders").with_column(Column::new("id", 1, DataTypeId::Int64.id()));
//! let (id, status) = catalog.tables().add_table(&table);
//! assert!(status.is_ok());
//! catalog
//!     .statistics()
//!     .set_table_statistic(id.unwrap(), json!({"numberOfTuples": 0}));
//! ```

pub mod config;
pub mod dao;
pub mod error;
pub mod manager;
pub mod message;
pub mod model;
pub mod provider;
pub mod session;

pub use config::{BackendKind, CatalogConfig, JsonConfig, PoolConfig, PostgresConfig};
pub use error::{CatalogError, CatalogResult, ErrorCode};
pub use manager::CatalogManager;
pub use message::{Message, MessageBroker, MessageId, MessageReceiver, Status};
pub use model::{
    AccessMethod, Column, Constraint, ConstraintType, DataType, DataTypeId, Direction, Index,
    MetadataKind, MetadataObject, ObjectId, Privilege, Record, Role, Statistic, StatisticOwner,
    Table, TablePrivileges,
};
pub use provider::{
    ConstraintsProvider, DataTypesProvider, IndexesProvider, PrivilegesProvider, RolesProvider,
    StatisticsProvider, TablesProvider,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
