// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Data type metadata

use super::{default_format_version, default_generation, MetadataKind, MetadataObject, ObjectId};
use serde::{Deserialize, Serialize};

/// Ids of the built-in data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeId {
    Int32,
    Int64,
    Float32,
    Float64,
    Char,
    Varchar,
}

impl DataTypeId {
    pub const ALL: [DataTypeId; 6] = [
        DataTypeId::Int32,
        DataTypeId::Int64,
        DataTypeId::Float32,
        DataTypeId::Float64,
        DataTypeId::Char,
        DataTypeId::Varchar,
    ];

    pub fn id(self) -> ObjectId {
        match self {
            DataTypeId::Int32 => 4,
            DataTypeId::Int64 => 6,
            DataTypeId::Float32 => 8,
            DataTypeId::Float64 => 9,
            DataTypeId::Char => 13,
            DataTypeId::Varchar => 14,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataTypeId::Int32 => "INT32",
            DataTypeId::Int64 => "INT64",
            DataTypeId::Float32 => "FLOAT32",
            DataTypeId::Float64 => "FLOAT64",
            DataTypeId::Char => "CHAR",
            DataTypeId::Varchar => "VARCHAR",
        }
    }

    /// PostgreSQL type oid, type name and qualified type name
    fn pg(self) -> (i64, &'static str, &'static str) {
        match self {
            DataTypeId::Int32 => (23, "integer", "int4"),
            DataTypeId::Int64 => (20, "bigint", "int8"),
            DataTypeId::Float32 => (700, "real", "float4"),
            DataTypeId::Float64 => (701, "double precision", "float8"),
            DataTypeId::Char => (1042, "char", "bpchar"),
            DataTypeId::Varchar => (1043, "varchar", "varchar"),
        }
    }
}

/// Data type metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_format_version")]
    pub format_version: i64,
    #[serde(default = "default_generation")]
    pub generation: i64,
    pub name: String,
    #[serde(rename = "pg_dataType", default)]
    pub pg_data_type: Option<i64>,
    #[serde(rename = "pg_dataTypeName", default)]
    pub pg_data_type_name: Option<String>,
    #[serde(rename = "pg_dataTypeQualifiedName", default)]
    pub pg_data_type_qualified_name: Option<String>,
}

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            format_version: default_format_version(),
            generation: default_generation(),
            name: name.into(),
            pg_data_type: None,
            pg_data_type_name: None,
            pg_data_type_qualified_name: None,
        }
    }

    pub fn builtin(which: DataTypeId) -> Self {
        let (oid, name, qualified) = which.pg();
        Self {
            id: Some(which.id()),
            pg_data_type: Some(oid),
            pg_data_type_name: Some(name.to_string()),
            pg_data_type_qualified_name: Some(qualified.to_string()),
            ..Self::new(which.name())
        }
    }

    /// All built-in data types in id order
    pub fn builtins() -> Vec<DataType> {
        DataTypeId::ALL.iter().map(|&t| DataType::builtin(t)).collect()
    }
}

impl MetadataObject for DataType {
    const KIND: MetadataKind = MetadataKind::DataType;

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
