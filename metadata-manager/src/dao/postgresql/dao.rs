// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Generic PostgreSQL DAO

use super::executor::{SqlExecutor, SqlParam};
use super::statements;
use crate::dao::schema::{KindSchema, ID};
use crate::dao::value::{check_upsert_key, filter_value, normalize_record, record_id};
use crate::dao::MetadataDao;
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use crate::model::{MetadataKind, ObjectId, Record};
use log::debug;
use serde_json::Value;

pub struct PgDao<'a> {
    schema: &'static KindSchema,
    executor: &'a mut dyn SqlExecutor,
}

impl<'a> PgDao<'a> {
    pub fn new(schema: &'static KindSchema, executor: &'a mut dyn SqlExecutor) -> Self {
        Self { schema, executor }
    }

    fn ensure_writable(&self, operation: &str) -> CatalogResult<()> {
        if self.schema.pg_read_only {
            Err(CatalogError::not_supported(format!(
                "{} on {} ({})",
                operation, self.schema.node, self.schema.relation
            )))
        } else {
            Ok(())
        }
    }

    fn bind_writable(&self, normalized: &Record) -> CatalogResult<Vec<SqlParam>> {
        self.schema
            .writable_fields()
            .map(|f| SqlParam::from_field(f, normalized.get(f.name).unwrap_or(&Value::Null)))
            .collect()
    }

    fn returned_id(&self, rows: Vec<Record>) -> CatalogResult<ObjectId> {
        rows.first().and_then(record_id).ok_or_else(|| {
            CatalogError::UnknownBackendError(
                Message::new(MessageId::RECORD_INSERT_FAILURE).arg(self.schema.relation),
            )
        })
    }
}

impl MetadataDao for PgDao<'_> {
    fn kind(&self) -> MetadataKind {
        self.schema.kind
    }

    fn select(&mut self, key: &str, value: &Value) -> CatalogResult<Vec<Record>> {
        let (field, wanted) = filter_value(self.schema, key, value)?;
        let param = SqlParam::from_field(field, &wanted)?;
        let sql = statements::select(self.schema, Some(field));
        self.executor.query(&sql, &[param])
    }

    fn select_all(&mut self) -> CatalogResult<Vec<Record>> {
        let sql = statements::select(self.schema, None);
        self.executor.query(&sql, &[])
    }

    fn insert(&mut self, record: &Record) -> CatalogResult<ObjectId> {
        self.ensure_writable("insert")?;
        let normalized = normalize_record(self.schema, record)?;
        let params = self.bind_writable(&normalized)?;
        let rows = self.executor.query(&statements::insert(self.schema), &params)?;
        let id = self.returned_id(rows)?;
        debug!("Inserted {} id={}", self.schema.node, id);
        Ok(id)
    }

    fn update(&mut self, id: ObjectId, record: &Record) -> CatalogResult<()> {
        self.ensure_writable("update")?;
        let normalized = normalize_record(self.schema, record)?;
        let mut params = self.bind_writable(&normalized)?;
        params.push(SqlParam::Int(Some(id)));
        match self.executor.execute(&statements::update(self.schema), &params)? {
            0 => Err(CatalogError::not_found(self.schema.node, ID, id)),
            _ => Ok(()),
        }
    }

    fn upsert(&mut self, key_fields: &[&str], record: &Record) -> CatalogResult<ObjectId> {
        self.ensure_writable("upsert")?;
        check_upsert_key(self.schema, key_fields)?;
        let normalized = normalize_record(self.schema, record)?;
        let params = self.bind_writable(&normalized)?;
        let rows = self
            .executor
            .query(&statements::upsert(self.schema, key_fields), &params)?;
        self.returned_id(rows)
    }

    fn delete(&mut self, key: &str, value: &Value) -> CatalogResult<u64> {
        self.ensure_writable("delete")?;
        let (field, wanted) = filter_value(self.schema, key, value)?;
        let param = SqlParam::from_field(field, &wanted)?;
        self.executor
            .execute(&statements::delete(self.schema, field), &[param])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::postgresql::executor::fake::{Call, RecordingExecutor};
    use crate::dao::postgresql::executor::map_sql_state;
    use crate::dao::schema::schema;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_select_binds_normalized_filter() {
        let mut exec = RecordingExecutor::default().returning(vec![rec(json!({"id": 1, "name": "t"}))]);
        let rows = PgDao::new(schema(MetadataKind::Column), &mut exec)
            .select("tableId", &json!("42"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        match &exec.calls[0] {
            Call::Query(sql, params) => {
                assert!(sql.contains("WHERE table_id = $1"));
                assert_eq!(params, &vec![SqlParam::Int(Some(42))]);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_insert_binds_every_writable_field() {
        let mut exec = RecordingExecutor::default().returning(vec![rec(json!({"id": 7}))]);
        let id = PgDao::new(schema(MetadataKind::Table), &mut exec)
            .insert(&rec(json!({"name": "orders", "acl": ["r"]})))
            .unwrap();
        assert_eq!(id, 7);
        match &exec.calls[0] {
            Call::Query(sql, params) => {
                assert!(sql.starts_with("INSERT INTO tsurugi_catalog.tsurugi_class"));
                assert_eq!(
                    params,
                    &vec![
                        SqlParam::Int(Some(1)),
                        SqlParam::Int(Some(1)),
                        SqlParam::Text(Some("orders".into())),
                        SqlParam::Text(None),
                        SqlParam::Int(None),
                        SqlParam::Json(Some(json!(["r"]))),
                        SqlParam::Int(None),
                    ]
                );
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_insert_without_returned_id() {
        let mut exec = RecordingExecutor::default().returning(vec![]);
        let err = PgDao::new(schema(MetadataKind::Table), &mut exec)
            .insert(&rec(json!({"name": "orders"})))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownBackendError);
    }

    #[test]
    fn test_unique_violation_surfaces_as_already_exists() {
        let mut exec = RecordingExecutor::default()
            .failing_query(map_sql_state("23505", "duplicate key value"));
        let err = PgDao::new(schema(MetadataKind::Table), &mut exec)
            .insert(&rec(json!({"name": "orders"})))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let mut exec = RecordingExecutor::default().affecting(0);
        let err = PgDao::new(schema(MetadataKind::Table), &mut exec)
            .update(5, &rec(json!({"name": "x"})))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        match &exec.calls[0] {
            Call::Execute(_, params) => assert_eq!(params.last(), Some(&SqlParam::Int(Some(5)))),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_roles_are_read_only() {
        let mut exec = RecordingExecutor::default();
        let mut dao = PgDao::new(schema(MetadataKind::Role), &mut exec);
        let err = dao.insert(&rec(json!({"name": "r"}))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotSupported);
        let err = dao.delete("name", &json!("r")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotSupported);
        assert!(dao.select_all().is_ok());
        assert_eq!(exec.calls.len(), 1);
    }

    #[test]
    fn test_delete_returns_affected_rows() {
        let mut exec = RecordingExecutor::default().affecting(3);
        let n = PgDao::new(schema(MetadataKind::Column), &mut exec)
            .delete("tableId", &json!(9))
            .unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_invalid_filter_never_reaches_backend() {
        let mut exec = RecordingExecutor::default();
        let err = PgDao::new(schema(MetadataKind::Table), &mut exec)
            .select("owner; DROP TABLE x", &json!(1))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        assert!(exec.calls.is_empty());
    }

    /// The row PostgreSQL would hold after binding `params`
    fn stored_row(schema: &KindSchema, id: ObjectId, params: &[SqlParam]) -> Record {
        let mut row = Record::new();
        row.insert(ID.to_string(), json!(id));
        for (field, param) in schema.writable_fields().zip(params) {
            let value = match param {
                SqlParam::Int(v) => json!(v),
                SqlParam::Text(v) => json!(v),
                SqlParam::Bool(v) => json!(v),
                SqlParam::Json(v) => v.clone().unwrap_or(Value::Null),
            };
            row.insert(field.name.to_string(), value);
        }
        row
    }

    #[test]
    fn test_every_kind_reads_back_what_was_written() {
        for kind in MetadataKind::ALL {
            let s = schema(kind);
            let input = crate::dao::samples::populated(kind);
            let mut exec = RecordingExecutor::default().returning(vec![rec(json!({"id": 21}))]);

            if s.pg_read_only {
                let err = PgDao::new(s, &mut exec).insert(&input).unwrap_err();
                assert_eq!(err.code(), ErrorCode::NotSupported, "{}", kind);
                continue;
            }

            let id = PgDao::new(s, &mut exec).insert(&input).unwrap();
            assert_eq!(id, 21);
            let stored = match &exec.calls[0] {
                Call::Query(_, params) => {
                    assert_eq!(params.len(), s.writable_fields().count(), "{}", kind);
                    stored_row(s, id, params)
                }
                other => panic!("unexpected call {:?}", other),
            };
            exec.rows.push_back(Ok(vec![stored]));

            let row = PgDao::new(s, &mut exec).select_one(ID, &json!(id)).unwrap();
            let mut expected = normalize_record(s, &input).unwrap();
            expected.insert(ID.to_string(), json!(id));
            assert_eq!(row, expected, "{}", kind);

            match &exec.calls[1] {
                Call::Query(sql, params) => {
                    assert!(sql.contains("WHERE id = $1"), "{}", sql);
                    assert_eq!(params, &vec![SqlParam::Int(Some(id))]);
                }
                other => panic!("unexpected call {:?}", other),
            }
        }
    }
}
