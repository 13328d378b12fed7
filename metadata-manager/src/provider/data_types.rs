// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Data type lookups. The catalog ships the built-in types; this provider
//! only reads them.

use super::base::{from_records, ProviderCore};
use crate::dao::schema::{ID, NAME};
use crate::message::Status;
use crate::model::{DataType, MetadataKind, MetadataObject, ObjectId};
use serde_json::Value;

pub struct DataTypesProvider {
    core: ProviderCore,
}

impl DataTypesProvider {
    pub fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    /// Exactly one data type whose `key` equals `value`
    pub fn get_data_type(&self, key: &str, value: &Value) -> (Option<DataType>, Status) {
        let result = self.core.transaction(|s| {
            let record = s.dao(MetadataKind::DataType)?.select_one(key, value)?;
            DataType::from_record(record)
        });
        self.core.reply(result)
    }

    pub fn get_data_type_by_id(&self, id: ObjectId) -> (Option<DataType>, Status) {
        self.get_data_type(ID, &Value::from(id))
    }

    pub fn get_data_type_by_name(&self, name: &str) -> (Option<DataType>, Status) {
        self.get_data_type(NAME, &Value::from(name))
    }

    pub fn get_data_types(&self) -> (Option<Vec<DataType>>, Status) {
        let result = self
            .core
            .transaction(|s| from_records(s.dao(MetadataKind::DataType)?.select_all()?));
        self.core.reply(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::DataTypeId;
    use crate::provider::base::testing::json_core;

    #[test]
    fn test_builtin_types() {
        let (core, _dir) = json_core();
        let types = DataTypesProvider::new(core);

        let all = types.get_data_types().0.unwrap();
        assert_eq!(all.len(), DataTypeId::ALL.len());

        let int64 = types.get_data_type_by_name("INT64").0.unwrap();
        assert_eq!(int64.id, Some(DataTypeId::Int64.id()));

        let by_id = types.get_data_type_by_id(DataTypeId::Varchar.id()).0.unwrap();
        assert_eq!(by_id.name, DataTypeId::Varchar.name());
    }

    #[test]
    fn test_lookup_errors() {
        let (core, _dir) = json_core();
        let types = DataTypesProvider::new(core);

        assert_eq!(types.get_data_type_by_name("BLOB").1.code(), ErrorCode::NotFound);
        assert_eq!(
            types.get_data_type("bogus", &Value::from(1)).1.code(),
            ErrorCode::InvalidParameter
        );
        // several built-in types share format version 1
        assert_eq!(
            types.get_data_type("formatVersion", &Value::from(1)).1.code(),
            ErrorCode::AmbiguousResult
        );
    }
}
