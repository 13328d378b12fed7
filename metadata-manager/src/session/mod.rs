// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Sessions and transactions
//!
//! A [`Session`] wraps one backend connection and at most one open
//! transaction. The [`DbSessionManager`] hands sessions out, drives
//! `start_transaction`/`commit`/`rollback`, and pools idle sessions.

pub mod connection;
pub mod factory;
pub mod json;
pub mod manager;
#[cfg(feature = "postgresql")]
pub mod postgresql;
#[allow(clippy::module_inception)]
pub mod session;

pub use connection::{BackendConnection, Connector};
pub use factory::{create_connector, create_session_manager};
pub use json::{JsonConnection, JsonConnector};
pub use manager::DbSessionManager;
#[cfg(feature = "postgresql")]
pub use postgresql::{PgConnection, PgConnector};
pub use session::{Session, TransactionId, TransactionState};
