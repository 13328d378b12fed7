// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Index metadata provider
//!
//! Indexes are looked up and removed by `id` or `name`. Adding or removing
//! an index counts as a change to its table.

use super::base::{from_records, ProviderCore};
use super::tables::require_table;
use crate::dao::schema::{ID, NAME};
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId, Status};
use crate::model::{Index, MetadataKind, MetadataObject, ObjectId};
use crate::session::Session;
use serde_json::Value;

pub struct IndexesProvider {
    core: ProviderCore,
}

impl IndexesProvider {
    pub fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    /// Add an index on an existing table; returns the index id
    pub fn add_index(&self, index: &Index) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            require_table(s, index.table_id)?;
            s.dao(MetadataKind::Index)?.insert(&index.to_record()?)
        });
        if result.is_ok() {
            self.table_altered(index.table_id);
        }
        self.core.reply(result)
    }

    /// Look an index up by `id` or `name`
    pub fn get_index(&self, key: &str, value: &Value) -> (Option<Index>, Status) {
        let result = self.core.transaction(|s| find_index(s, key, value));
        self.core.reply(result)
    }

    pub fn get_index_by_id(&self, id: ObjectId) -> (Option<Index>, Status) {
        self.get_index(ID, &Value::from(id))
    }

    pub fn get_index_by_name(&self, name: &str) -> (Option<Index>, Status) {
        self.get_index(NAME, &Value::from(name))
    }

    pub fn get_indexes(&self) -> (Option<Vec<Index>>, Status) {
        let result = self
            .core
            .transaction(|s| from_records(s.dao(MetadataKind::Index)?.select_all()?));
        self.core.reply(result)
    }

    /// Remove the index matching `key` (`id` or `name`); returns its id
    pub fn remove_index(&self, key: &str, value: &Value) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            let index = find_index(s, key, value)?;
            let id = index
                .id
                .ok_or_else(|| CatalogError::conversion(ID, "index row without id"))?;
            s.dao(MetadataKind::Index)?.delete(ID, &Value::from(id))?;
            Ok((id, index.table_id))
        });
        let result = result.map(|(id, table_id)| {
            self.table_altered(table_id);
            id
        });
        self.core.reply(result)
    }

    fn table_altered(&self, table_id: ObjectId) {
        self.core
            .publish(Message::new(MessageId::ALTER_TABLE).arg(table_id));
    }
}

fn find_index(s: &mut Session, key: &str, value: &Value) -> CatalogResult<Index> {
    if key != ID && key != NAME {
        return Err(CatalogError::invalid_parameter(format!(
            "indexes are looked up by {} or {}, not {}",
            ID, NAME, key
        )));
    }
    let record = s.dao(MetadataKind::Index)?.select_one(key, value)?;
    Index::from_record(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{Column, DataTypeId, Direction, Table};
    use crate::provider::base::testing::json_core;
    use crate::provider::TablesProvider;
    use serde_json::json;

    fn setup() -> (TablesProvider, IndexesProvider, ObjectId, tempfile::TempDir) {
        let (core, dir) = json_core();
        let tables = TablesProvider::new(core.clone());
        let indexes = IndexesProvider::new(core);
        let id = tables
            .add_table(
                &Table::new("t")
                    .with_column(Column::new("a", 1, DataTypeId::Int32.id()))
                    .with_column(Column::new("b", 2, DataTypeId::Int64.id())),
            )
            .0
            .unwrap();
        (tables, indexes, id, dir)
    }

    #[test]
    fn test_index_lifecycle() {
        let (_tables, indexes, table_id, _dir) = setup();
        let index = Index::new("t_a_b", table_id)
            .on_columns(&[1, 2])
            .with_directions(&[Direction::AscNullsLast, Direction::DescNullsLast])
            .unique();

        let (id, status) = indexes.add_index(&index);
        assert!(status.is_ok(), "{}", status);
        let id = id.unwrap();

        let by_id = indexes.get_index_by_id(id).0.unwrap();
        assert_eq!(by_id.name, "t_a_b");
        assert_eq!(by_id.number_of_key_columns, Some(2));
        assert_eq!(by_id.options, Some(json!([0, 2])));
        assert_eq!(by_id.is_unique, Some(true));
        assert_eq!(by_id.access_method, Some(0));
        assert_eq!(indexes.get_index_by_name("t_a_b").0.unwrap().id, Some(id));
        assert_eq!(indexes.get_indexes().0.unwrap().len(), 1);

        assert_eq!(
            indexes.add_index(&Index::new("t_a_b", table_id)).1.code(),
            ErrorCode::AlreadyExists
        );

        assert_eq!(indexes.remove_index(NAME, &json!("t_a_b")).0, Some(id));
        assert_eq!(
            indexes.remove_index(ID, &json!(id)).1.code(),
            ErrorCode::NotFound
        );
        assert!(indexes.get_indexes().0.unwrap().is_empty());
    }

    #[test]
    fn test_lookup_key_must_be_id_or_name() {
        let (_tables, indexes, table_id, _dir) = setup();
        indexes.add_index(&Index::new("i", table_id).on_columns(&[1]));

        assert_eq!(
            indexes.get_index("tableId", &json!(table_id)).1.code(),
            ErrorCode::InvalidParameter
        );
        assert_eq!(
            indexes.remove_index("tableId", &json!(table_id)).1.code(),
            ErrorCode::InvalidParameter
        );
        assert_eq!(indexes.get_indexes().0.unwrap().len(), 1);
    }

    #[test]
    fn test_index_requires_table() {
        let (tables, indexes, table_id, _dir) = setup();
        assert_eq!(
            indexes.add_index(&Index::new("orphan", table_id + 1)).1.code(),
            ErrorCode::ReferenceNotFound
        );

        indexes.add_index(&Index::new("i", table_id).on_columns(&[2]));
        assert!(tables.remove_table(table_id).1.is_ok());
        assert!(indexes.get_indexes().0.unwrap().is_empty());
    }
}
