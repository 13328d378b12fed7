// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Data access objects
//!
//! One [`MetadataDao`] per metadata kind per backend. A DAO translates a
//! catalog operation into backend calls and runs inside whatever
//! transaction is active on the session that handed it out; it never
//! begins, commits or rolls back on its own.
//!
//! - [`json`]: edits the transaction buffer of a JSON metadata document
//! - [`postgresql`]: parameterized statements over a [`postgresql::SqlExecutor`]

pub mod json;
pub mod postgresql;
pub mod schema;
pub mod value;

pub use schema::{schema, FieldDef, FieldType, KindSchema};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{MetadataKind, ObjectId, Record};
use serde_json::Value;

/// Uniform access to the stored objects of one metadata kind
///
/// Records are returned in schema field order, sorted by id.
pub trait MetadataDao {
    fn kind(&self) -> MetadataKind;

    /// All objects whose `key` field equals `value`
    fn select(&mut self, key: &str, value: &Value) -> CatalogResult<Vec<Record>>;

    fn select_all(&mut self) -> CatalogResult<Vec<Record>>;

    /// Exactly one object whose `key` field equals `value`
    ///
    /// Fails with `NotFound` on zero matches and `AmbiguousResult` on more
    /// than one.
    fn select_one(&mut self, key: &str, value: &Value) -> CatalogResult<Record> {
        let mut rows = self.select(key, value)?;
        match rows.len() {
            0 => Err(CatalogError::not_found(self.kind().node(), key, value)),
            1 => Ok(rows.remove(0)),
            n => Err(CatalogError::ambiguous(self.kind().node(), key, value, n)),
        }
    }

    /// Store a new object and return its assigned id
    fn insert(&mut self, record: &Record) -> CatalogResult<ObjectId>;

    /// Replace every field of object `id`. Fails with `NotFound` when absent.
    fn update(&mut self, id: ObjectId, record: &Record) -> CatalogResult<()>;

    /// Insert, or replace the object matching `record` on `key_fields`
    ///
    /// `key_fields` must be one of the kind's unique keys. Returns the id of
    /// the inserted or replaced object.
    fn upsert(&mut self, key_fields: &[&str], record: &Record) -> CatalogResult<ObjectId>;

    /// Remove every object whose `key` field equals `value`
    fn delete(&mut self, key: &str, value: &Value) -> CatalogResult<u64>;
}

#[cfg(test)]
pub(crate) mod samples {
    //! One record per kind with every field set

    use super::*;
    use serde_json::json;

    pub(crate) fn populated(kind: MetadataKind) -> Record {
        let value = match kind {
            MetadataKind::Table => json!({
                "name": "orders", "namespace": "public", "ownerRoleId": 10,
                "acl": ["alice=rw/admin"], "numberOfTuples": 1200
            }),
            MetadataKind::Column => json!({
                "name": "note", "tableId": "3", "columnNumber": 2, "dataTypeId": 13,
                "dataLength": [64], "varying": true, "isNotNull": false,
                "defaultExpression": "'none'"
            }),
            MetadataKind::Constraint => json!({
                "name": "orders_pk", "tableId": 3, "type": 0, "columns": [1, 2],
                "columnsId": [31, 32], "indexId": 5, "expression": "id > 0"
            }),
            MetadataKind::DataType => json!({
                "name": "DECIMAL", "pg_dataType": 1700, "pg_dataTypeName": "numeric",
                "pg_dataTypeQualifiedName": "pg_catalog.numeric"
            }),
            MetadataKind::Role => json!({
                "name": "alice", "rolsuper": false, "rolinherit": true,
                "rolcreaterole": false, "rolcreatedb": true, "rolcanlogin": true,
                "rolreplication": false, "rolbypassrls": false, "rolconnlimit": 5,
                "rolpassword": "********", "rolvaliduntil": "2030-01-01 00:00:00+00"
            }),
            MetadataKind::Statistic => json!({
                "name": "orders.note", "ownerKind": "column", "ownerId": 32, "tableId": 3,
                "columnNumber": 2, "statistic": {"ndv": 17, "histogram": [1, 5, 9]}
            }),
            MetadataKind::Index => json!({
                "name": "orders_note_idx", "namespace": "public", "ownerId": 10,
                "acl": [], "tableId": 3, "accessMethod": 0, "isUnique": true,
                "isPrimary": false, "numberOfKeyColumns": 1, "columns": [2, 1],
                "columnsId": [32, 31], "options": [2, 15]
            }),
        };
        match value {
            Value::Object(record) => record,
            _ => Record::new(),
        }
    }
}
