// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! PostgreSQL backend DAOs
//!
//! Statement construction and the DAOs only depend on the [`SqlExecutor`]
//! seam. The live client behind it is compiled with the `postgresql`
//! feature.

#[cfg(feature = "postgresql")]
pub mod client;
pub mod dao;
pub mod ddl;
pub mod executor;
pub mod statements;

#[cfg(feature = "postgresql")]
pub use client::PgExecutor;
pub use dao::PgDao;
pub use ddl::install_schema;
pub use executor::{map_sql_state, SqlExecutor, SqlParam};
