// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Backend connection traits
//!
//! Each backend provides a [`Connector`] that opens [`BackendConnection`]s.
//! The connector is chosen once when the session manager is built; a
//! connection never switches backend.

use crate::config::BackendKind;
use crate::dao::MetadataDao;
use crate::error::CatalogResult;
use crate::model::MetadataKind;

/// One physical handle to a backend instance
///
/// The session layer guarantees `begin` is only called with no transaction
/// open, and `commit`/`rollback`/`dao` only with one open. After `commit`
/// returns, successfully or not, the transaction is over.
pub trait BackendConnection: Send {
    fn backend(&self) -> BackendKind;

    fn begin(&mut self) -> CatalogResult<()>;

    fn commit(&mut self) -> CatalogResult<()>;

    fn rollback(&mut self) -> CatalogResult<()>;

    /// DAO for `kind` bound to the open transaction
    fn dao(&mut self, kind: MetadataKind) -> CatalogResult<Box<dyn MetadataDao + '_>>;

    /// Whether the connection can still be used; checked before pooling
    fn is_valid(&mut self) -> bool;
}

/// Opens connections to one configured backend
pub trait Connector: Send + Sync {
    fn backend(&self) -> BackendKind;

    fn connect(&self) -> CatalogResult<Box<dyn BackendConnection>>;
}
