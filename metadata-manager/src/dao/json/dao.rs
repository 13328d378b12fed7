// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! DAO over the transaction buffer of a JSON metadata document

use super::document::MetadataDocument;
use crate::dao::schema::{KindSchema, ID};
use crate::dao::value::{
    check_upsert_key, filter_value, key_values, normalize_record, record_id, sort_by_id,
};
use crate::dao::MetadataDao;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{MetadataKind, ObjectId, Record};
use serde_json::Value;

/// Generic JSON DAO for one metadata kind
///
/// Edits only the borrowed document buffer. The buffer belongs to the open
/// transaction and is written to disk on commit.
pub struct JsonDao<'a> {
    schema: &'static KindSchema,
    doc: &'a mut MetadataDocument,
}

impl<'a> JsonDao<'a> {
    pub fn new(schema: &'static KindSchema, doc: &'a mut MetadataDocument) -> Self {
        Self { schema, doc }
    }

    fn rows(&self) -> &Vec<Record> {
        self.doc.rows(self.schema.kind)
    }

    fn position_of(&self, id: ObjectId) -> Option<usize> {
        self.rows().iter().position(|r| record_id(r) == Some(id))
    }

    /// Fail with `AlreadyExists` if `record` collides with a row other than
    /// `except` on any unique key
    fn check_unique(&self, record: &Record, except: Option<ObjectId>) -> CatalogResult<()> {
        for key in self.schema.unique_keys {
            let Some(wanted) = key_values(record, key) else {
                continue;
            };
            let clash = self.rows().iter().any(|row| {
                record_id(row) != except && key_values(row, key).as_ref() == Some(&wanted)
            });
            if clash {
                let detail = key
                    .iter()
                    .zip(wanted.iter())
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(CatalogError::already_exists(self.schema.node, detail));
            }
        }
        Ok(())
    }

    fn find_by_key(&self, key_fields: &[&str], record: &Record) -> Option<ObjectId> {
        let wanted = key_values(record, key_fields)?;
        self.rows()
            .iter()
            .find(|row| key_values(row, key_fields).as_ref() == Some(&wanted))
            .and_then(record_id)
    }

    fn replace(&mut self, id: ObjectId, mut normalized: Record) -> CatalogResult<()> {
        let pos = self
            .position_of(id)
            .ok_or_else(|| CatalogError::not_found(self.schema.node, ID, id))?;
        self.check_unique(&normalized, Some(id))?;
        normalized.insert(ID.to_string(), Value::from(id));
        self.doc.rows_mut(self.schema.kind)[pos] = normalized;
        self.doc.mark_dirty();
        Ok(())
    }

    fn append(&mut self, mut normalized: Record) -> CatalogResult<ObjectId> {
        self.check_unique(&normalized, None)?;
        let id = self.doc.next_id(self.schema.kind);
        normalized.insert(ID.to_string(), Value::from(id));
        self.doc.rows_mut(self.schema.kind).push(normalized);
        self.doc.mark_dirty();
        Ok(id)
    }
}

impl MetadataDao for JsonDao<'_> {
    fn kind(&self) -> MetadataKind {
        self.schema.kind
    }

    fn select(&mut self, key: &str, value: &Value) -> CatalogResult<Vec<Record>> {
        let (field, wanted) = filter_value(self.schema, key, value)?;
        let mut rows: Vec<Record> = self
            .rows()
            .iter()
            .filter(|row| row.get(field.name) == Some(&wanted))
            .cloned()
            .collect();
        sort_by_id(&mut rows);
        Ok(rows)
    }

    fn select_all(&mut self) -> CatalogResult<Vec<Record>> {
        let mut rows = self.rows().clone();
        sort_by_id(&mut rows);
        Ok(rows)
    }

    fn insert(&mut self, record: &Record) -> CatalogResult<ObjectId> {
        let normalized = normalize_record(self.schema, record)?;
        self.append(normalized)
    }

    fn update(&mut self, id: ObjectId, record: &Record) -> CatalogResult<()> {
        let normalized = normalize_record(self.schema, record)?;
        self.replace(id, normalized)
    }

    fn upsert(&mut self, key_fields: &[&str], record: &Record) -> CatalogResult<ObjectId> {
        check_upsert_key(self.schema, key_fields)?;
        let normalized = normalize_record(self.schema, record)?;
        match self.find_by_key(key_fields, &normalized) {
            Some(id) => {
                self.replace(id, normalized)?;
                Ok(id)
            }
            None => self.append(normalized),
        }
    }

    fn delete(&mut self, key: &str, value: &Value) -> CatalogResult<u64> {
        let (field, wanted) = filter_value(self.schema, key, value)?;
        let rows = self.doc.rows_mut(self.schema.kind);
        let before = rows.len();
        rows.retain(|row| row.get(field.name) != Some(&wanted));
        let removed = (before - rows.len()) as u64;
        if removed > 0 {
            self.doc.mark_dirty();
        }
        Ok(removed)
    }
}
