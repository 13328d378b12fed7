// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog object model
//!
//! DAOs exchange generic [`Record`]s (ordered property trees). Providers
//! expose typed objects which convert to and from records through
//! [`MetadataObject`].

pub mod data_type;
pub mod index;
pub mod privilege;
pub mod role;
pub mod statistic;
pub mod table;

pub use data_type::{DataType, DataTypeId};
pub use index::{AccessMethod, Direction, Index};
pub use privilege::{Privilege, TablePrivileges};
pub use role::Role;
pub use statistic::{Statistic, StatisticOwner};
pub use table::{Column, Constraint, ConstraintType, Table};

use crate::error::{CatalogError, CatalogResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered field mapping for one stored object
pub type Record = serde_json::Map<String, Value>;

/// Backend-assigned object identifier
pub type ObjectId = i64;

/// Initial value of `formatVersion` and `generation`
pub const INITIAL_FORMAT_VERSION: i64 = 1;
pub const INITIAL_GENERATION: i64 = 1;

/// Metadata object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataKind {
    Table,
    Column,
    Constraint,
    DataType,
    Role,
    Statistic,
    Index,
}

impl MetadataKind {
    pub const ALL: [MetadataKind; 7] = [
        MetadataKind::Table,
        MetadataKind::Column,
        MetadataKind::Constraint,
        MetadataKind::DataType,
        MetadataKind::Role,
        MetadataKind::Statistic,
        MetadataKind::Index,
    ];

    /// Name of the collection holding objects of this kind
    pub fn node(self) -> &'static str {
        match self {
            MetadataKind::Table => "tables",
            MetadataKind::Column => "columns",
            MetadataKind::Constraint => "constraints",
            MetadataKind::DataType => "dataTypes",
            MetadataKind::Role => "roles",
            MetadataKind::Statistic => "statistics",
            MetadataKind::Index => "indexes",
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node())
    }
}

/// A typed catalog object backed by a [`Record`]
pub trait MetadataObject: Serialize + DeserializeOwned {
    const KIND: MetadataKind;

    fn id(&self) -> Option<ObjectId>;

    fn to_record(&self) -> CatalogResult<Record> {
        match serde_json::to_value(self) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(other) => Err(CatalogError::conversion(
                Self::KIND.node(),
                format!("expected an object, got {}", other),
            )),
            Err(e) => Err(CatalogError::conversion(Self::KIND.node(), e)),
        }
    }

    fn from_record(record: Record) -> CatalogResult<Self> {
        serde_json::from_value(Value::Object(record))
            .map_err(|e| CatalogError::conversion(Self::KIND.node(), e))
    }
}

pub(crate) fn default_format_version() -> i64 {
    INITIAL_FORMAT_VERSION
}

pub(crate) fn default_generation() -> i64 {
    INITIAL_GENERATION
}
