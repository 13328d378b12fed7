// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Statistic metadata
//!
//! A statistic belongs to exactly one table or column. It is stored keyed by
//! `(ownerKind, ownerId)` so setting it again replaces the previous value.

use super::{default_format_version, default_generation, MetadataKind, MetadataObject, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OWNER_TABLE: &str = "table";
pub const OWNER_COLUMN: &str = "column";

/// Object a statistic describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticOwner {
    Table(ObjectId),
    Column(ObjectId),
}

impl StatisticOwner {
    pub fn kind(&self) -> &'static str {
        match self {
            StatisticOwner::Table(_) => OWNER_TABLE,
            StatisticOwner::Column(_) => OWNER_COLUMN,
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            StatisticOwner::Table(id) | StatisticOwner::Column(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_format_version")]
    pub format_version: i64,
    #[serde(default = "default_generation")]
    pub generation: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub owner_kind: String,
    pub owner_id: ObjectId,
    pub table_id: ObjectId,
    #[serde(default)]
    pub column_number: Option<i64>,
    #[serde(default)]
    pub statistic: Option<Value>,
}

impl Statistic {
    pub fn for_table(table_id: ObjectId, statistic: Value) -> Self {
        Self {
            id: None,
            format_version: default_format_version(),
            generation: default_generation(),
            name: None,
            owner_kind: OWNER_TABLE.to_string(),
            owner_id: table_id,
            table_id,
            column_number: None,
            statistic: Some(statistic),
        }
    }

    pub fn for_column(
        table_id: ObjectId,
        column_id: ObjectId,
        column_number: i64,
        statistic: Value,
    ) -> Self {
        Self {
            owner_kind: OWNER_COLUMN.to_string(),
            owner_id: column_id,
            column_number: Some(column_number),
            ..Self::for_table(table_id, statistic)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Owner of this statistic, `None` for an unrecognized owner kind
    pub fn owner(&self) -> Option<StatisticOwner> {
        match self.owner_kind.as_str() {
            OWNER_TABLE => Some(StatisticOwner::Table(self.owner_id)),
            OWNER_COLUMN => Some(StatisticOwner::Column(self.owner_id)),
            _ => None,
        }
    }

    /// `numberOfTuples` carried by the statistic payload, if numeric
    pub fn number_of_tuples(&self) -> Option<i64> {
        self.statistic
            .as_ref()
            .and_then(|s| s.get("numberOfTuples"))
            .and_then(Value::as_i64)
    }
}

impl MetadataObject for Statistic {
    const KIND: MetadataKind = MetadataKind::Statistic;

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
