// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! JSON metadata document
//!
//! One file per database:
//!
//! ```text
//! { "formatVersion": 1,
//!   "sequences": { "tables": 3, ... },
//!   "tables": [...], "columns": [...], "constraints": [...],
//!   "dataTypes": [...], "roles": [...], "statistics": [...],
//!   "indexes": [...] }
//! ```

use crate::dao::schema::{schema, ID};
use crate::dao::value::{normalize_record, record_id};
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use crate::model::{DataType, MetadataKind, MetadataObject, ObjectId, Record};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DOCUMENT_FORMAT_VERSION: i64 = 1;

fn document_format_version() -> i64 {
    DOCUMENT_FORMAT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    #[serde(default = "document_format_version")]
    pub format_version: i64,
    /// Last id handed out per node
    #[serde(default)]
    pub sequences: BTreeMap<String, ObjectId>,
    #[serde(default)]
    pub tables: Vec<Record>,
    #[serde(default)]
    pub columns: Vec<Record>,
    #[serde(default)]
    pub constraints: Vec<Record>,
    #[serde(default)]
    pub data_types: Vec<Record>,
    #[serde(default)]
    pub roles: Vec<Record>,
    #[serde(default)]
    pub statistics: Vec<Record>,
    #[serde(default)]
    pub indexes: Vec<Record>,
    /// Set once the buffer differs from what was loaded
    #[serde(skip)]
    dirty: bool,
}

impl Default for MetadataDocument {
    fn default() -> Self {
        Self {
            format_version: DOCUMENT_FORMAT_VERSION,
            sequences: BTreeMap::new(),
            tables: Vec::new(),
            columns: Vec::new(),
            constraints: Vec::new(),
            data_types: Vec::new(),
            roles: Vec::new(),
            statistics: Vec::new(),
            indexes: Vec::new(),
            dirty: false,
        }
    }
}

impl MetadataDocument {
    /// A new document holding the built-in data types
    pub fn seeded() -> CatalogResult<Self> {
        let mut doc = Self::default();
        let data_types = schema(MetadataKind::DataType);
        for builtin in DataType::builtins() {
            let id = builtin.id.unwrap_or_default();
            let mut record = normalize_record(data_types, &builtin.to_record()?)?;
            record.insert(ID.to_string(), Value::from(id));
            doc.data_types.push(record);
            doc.advance_sequence(MetadataKind::DataType, id);
        }
        Ok(doc)
    }

    pub fn rows(&self, kind: MetadataKind) -> &Vec<Record> {
        match kind {
            MetadataKind::Table => &self.tables,
            MetadataKind::Column => &self.columns,
            MetadataKind::Constraint => &self.constraints,
            MetadataKind::DataType => &self.data_types,
            MetadataKind::Role => &self.roles,
            MetadataKind::Statistic => &self.statistics,
            MetadataKind::Index => &self.indexes,
        }
    }

    pub fn rows_mut(&mut self, kind: MetadataKind) -> &mut Vec<Record> {
        match kind {
            MetadataKind::Table => &mut self.tables,
            MetadataKind::Column => &mut self.columns,
            MetadataKind::Constraint => &mut self.constraints,
            MetadataKind::DataType => &mut self.data_types,
            MetadataKind::Role => &mut self.roles,
            MetadataKind::Statistic => &mut self.statistics,
            MetadataKind::Index => &mut self.indexes,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether any row or sequence changed since the document was loaded
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Allocate the next id for `kind`
    ///
    /// Never reuses an id that is still present, even if the sequence entry
    /// was edited by hand.
    pub fn next_id(&mut self, kind: MetadataKind) -> ObjectId {
        let last = self.sequences.get(kind.node()).copied().unwrap_or(0);
        let max_row = self
            .rows(kind)
            .iter()
            .filter_map(record_id)
            .max()
            .unwrap_or(0);
        let id = last.max(max_row) + 1;
        self.advance_sequence(kind, id);
        id
    }

    fn advance_sequence(&mut self, kind: MetadataKind, id: ObjectId) {
        let entry = self.sequences.entry(kind.node().to_string()).or_insert(0);
        if *entry < id {
            *entry = id;
        }
    }

    /// Read and parse the document at `path`
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CatalogError::UnknownBackendError(
                Message::new(MessageId::READ_JSON_FILE_FAILURE)
                    .arg(path.display())
                    .arg(e),
            )
        })?;
        serde_json::from_str(&text).map_err(|e| {
            CatalogError::UnknownBackendError(
                Message::new(MessageId::READ_JSON_FILE_FAILURE)
                    .arg(path.display())
                    .arg(e),
            )
        })
    }

    /// Replace the file at `path` with this document
    ///
    /// The document is written to `<path>.tmp`, synced, and renamed over
    /// `path`, so readers see either the old or the new file in full.
    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        let write_failure = |e: &dyn std::fmt::Display| {
            CatalogError::UnknownBackendError(
                Message::new(MessageId::WRITE_JSON_FILE_FAILURE)
                    .arg(path.display())
                    .arg(e),
            )
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| {
            CatalogError::UnknownBackendError(Message::new(MessageId::WRITE_JSON_FAILURE).arg(e))
        })?;

        let tmp_path = temp_path(path);
        let mut file = fs::File::create(&tmp_path).map_err(|e| write_failure(&e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| write_failure(&e))?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_failure(&e));
        }
        debug!("Saved metadata document {}", path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
