// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table, column and constraint metadata

use super::{default_format_version, default_generation, MetadataKind, MetadataObject, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Table metadata together with its columns and constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
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
    pub owner_role_id: Option<ObjectId>,
    #[serde(default)]
    pub acl: Option<Value>,
    #[serde(default)]
    pub number_of_tuples: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            format_version: default_format_version(),
            generation: default_generation(),
            name: name.into(),
            namespace: None,
            owner_role_id: None,
            acl: None,
            number_of_tuples: None,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl MetadataObject for Table {
    const KIND: MetadataKind = MetadataKind::Table;

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_format_version")]
    pub format_version: i64,
    #[serde(default = "default_generation")]
    pub generation: i64,
    pub name: String,
    /// Owning table. Filled in by the provider when the column is added with
    /// its table.
    #[serde(default)]
    pub table_id: Option<ObjectId>,
    /// 1-based ordinal position within the table
    pub column_number: i64,
    pub data_type_id: ObjectId,
    /// Length parameters, e.g. `[32]` for `VARCHAR(32)`
    #[serde(default)]
    pub data_length: Option<Value>,
    #[serde(default)]
    pub varying: Option<bool>,
    #[serde(default)]
    pub is_not_null: Option<bool>,
    #[serde(default)]
    pub default_expression: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_number: i64, data_type_id: ObjectId) -> Self {
        Self {
            id: None,
            format_version: default_format_version(),
            generation: default_generation(),
            name: name.into(),
            table_id: None,
            column_number,
            data_type_id,
            data_length: None,
            varying: None,
            is_not_null: None,
            default_expression: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = Some(true);
        self
    }

    pub fn with_length(mut self, length: i64, varying: bool) -> Self {
        self.data_length = Some(Value::Array(vec![Value::from(length)]));
        self.varying = Some(varying);
        self
    }
}

impl MetadataObject for Column {
    const KIND: MetadataKind = MetadataKind::Column;

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

/// Kind of table constraint, stored as its numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    PrimaryKey,
    Unique,
    Check,
    ForeignKey,
}

impl ConstraintType {
    pub fn code(self) -> i64 {
        match self {
            ConstraintType::PrimaryKey => 0,
            ConstraintType::Unique => 1,
            ConstraintType::Check => 2,
            ConstraintType::ForeignKey => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ConstraintType::PrimaryKey),
            1 => Some(ConstraintType::Unique),
            2 => Some(ConstraintType::Check),
            3 => Some(ConstraintType::ForeignKey),
            _ => None,
        }
    }
}

/// Table constraint metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_format_version")]
    pub format_version: i64,
    #[serde(default = "default_generation")]
    pub generation: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub table_id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub constraint_type: i64,
    /// Column numbers the constraint applies to
    #[serde(default)]
    pub columns: Option<Value>,
    /// Column ids the constraint applies to
    #[serde(default)]
    pub columns_id: Option<Value>,
    #[serde(default)]
    pub index_id: Option<ObjectId>,
    #[serde(default)]
    pub expression: Option<String>,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType) -> Self {
        Self {
            id: None,
            format_version: default_format_version(),
            generation: default_generation(),
            name: None,
            table_id: None,
            constraint_type: constraint_type.code(),
            columns: None,
            columns_id: None,
            index_id: None,
            expression: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn on_columns(mut self, column_numbers: &[i64]) -> Self {
        self.columns = Some(Value::from(column_numbers.to_vec()));
        self
    }

    pub fn kind(&self) -> Option<ConstraintType> {
        ConstraintType::from_code(self.constraint_type)
    }
}

impl MetadataObject for Constraint {
    const KIND: MetadataKind = MetadataKind::Constraint;

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
