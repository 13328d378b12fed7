// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Index metadata

use super::{default_format_version, default_generation, MetadataKind, MetadataObject, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Index access method, stored as its numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMethod {
    Default,
}

impl AccessMethod {
    pub fn code(self) -> i64 {
        match self {
            AccessMethod::Default => 0,
        }
    }
}

/// Sort direction and null placement of one index key column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    AscNullsLast,
    AscNullsFirst,
    DescNullsLast,
    DescNullsFirst,
    Default,
}

impl Direction {
    pub fn code(self) -> i64 {
        match self {
            Direction::AscNullsLast => 0,
            Direction::AscNullsFirst => 1,
            Direction::DescNullsLast => 2,
            Direction::DescNullsFirst => 3,
            Direction::Default => 15,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Direction::AscNullsLast),
            1 => Some(Direction::AscNullsFirst),
            2 => Some(Direction::DescNullsLast),
            3 => Some(Direction::DescNullsFirst),
            15 => Some(Direction::Default),
            _ => None,
        }
    }
}

/// Index metadata
///
/// `columns` holds the column numbers covered by the index, key columns
/// first; the first `numberOfKeyColumns` of them form the key. `options`
/// holds one [`Direction`] code per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_format_version")]
    pub format_version: i64,
    #[serde(default = "default_generation")]
    pub generation: i64,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub owner_id: Option<ObjectId>,
    #[serde(default)]
    pub acl: Option<Value>,
    pub table_id: ObjectId,
    #[serde(default)]
    pub access_method: Option<i64>,
    #[serde(default)]
    pub is_unique: Option<bool>,
    #[serde(default)]
    pub is_primary: Option<bool>,
    #[serde(default)]
    pub number_of_key_columns: Option<i64>,
    #[serde(default)]
    pub columns: Option<Value>,
    #[serde(default)]
    pub columns_id: Option<Value>,
    #[serde(default)]
    pub options: Option<Value>,
}

impl Index {
    pub fn new(name: impl Into<String>, table_id: ObjectId) -> Self {
        Self {
            id: None,
            format_version: default_format_version(),
            generation: default_generation(),
            name: name.into(),
            namespace: None,
            owner_id: None,
            acl: None,
            table_id,
            access_method: Some(AccessMethod::Default.code()),
            is_unique: Some(false),
            is_primary: Some(false),
            number_of_key_columns: None,
            columns: None,
            columns_id: None,
            options: None,
        }
    }

    /// Index `column_numbers`, all of them key columns, in the default order
    pub fn on_columns(mut self, column_numbers: &[i64]) -> Self {
        self.columns = Some(Value::from(column_numbers.to_vec()));
        self.number_of_key_columns = Some(column_numbers.len() as i64);
        self.options = Some(Value::from(vec![
            Direction::Default.code();
            column_numbers.len()
        ]));
        self
    }

    pub fn with_directions(mut self, directions: &[Direction]) -> Self {
        let codes: Vec<i64> = directions.iter().map(|d| d.code()).collect();
        self.options = Some(Value::from(codes));
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = Some(true);
        self
    }

    pub fn primary(mut self) -> Self {
        self.is_unique = Some(true);
        self.is_primary = Some(true);
        self
    }

    /// Number of columns the index covers
    pub fn number_of_columns(&self) -> usize {
        self.columns
            .as_ref()
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn directions(&self) -> Vec<Option<Direction>> {
        self.options
            .as_ref()
            .and_then(Value::as_array)
            .map(|codes| {
                codes
                    .iter()
                    .map(|c| c.as_i64().and_then(Direction::from_code))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl MetadataObject for Index {
    const KIND: MetadataKind = MetadataKind::Index;

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
