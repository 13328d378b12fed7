// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Statement execution seam for the PostgreSQL DAOs

use crate::dao::schema::{FieldDef, FieldType};
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use crate::model::Record;
use serde_json::Value;

/// A typed statement parameter. `None` binds SQL NULL of that type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i64>),
    Text(Option<String>),
    Bool(Option<bool>),
    Json(Option<Value>),
}

impl SqlParam {
    /// Bind an already normalized value of `field`
    pub fn from_field(field: &FieldDef, value: &Value) -> CatalogResult<Self> {
        let mismatch = || CatalogError::conversion(field.name, format!("cannot bind {}", value));
        Ok(match (field.ty, value) {
            (FieldType::Int, Value::Null) => SqlParam::Int(None),
            (FieldType::Int, v) => SqlParam::Int(Some(v.as_i64().ok_or_else(mismatch)?)),
            (FieldType::Text, Value::Null) => SqlParam::Text(None),
            (FieldType::Text, Value::String(s)) => SqlParam::Text(Some(s.clone())),
            (FieldType::Bool, Value::Null) => SqlParam::Bool(None),
            (FieldType::Bool, Value::Bool(b)) => SqlParam::Bool(Some(*b)),
            (FieldType::Json, Value::Null) => SqlParam::Json(None),
            (FieldType::Json, v) => SqlParam::Json(Some(v.clone())),
            _ => return Err(mismatch()),
        })
    }
}

/// Executes parameterized SQL on one connection
///
/// Statements only ever carry `$n` placeholders; values travel as
/// [`SqlParam`]s.
pub trait SqlExecutor {
    /// Run a statement returning rows, each keyed by output column name
    fn query(&mut self, sql: &str, params: &[SqlParam]) -> CatalogResult<Vec<Record>>;

    /// Run a statement and return the number of affected rows
    fn execute(&mut self, sql: &str, params: &[SqlParam]) -> CatalogResult<u64>;

    /// Run one or more parameterless statements
    fn batch_execute(&mut self, sql: &str) -> CatalogResult<()>;
}

/// Translate a PostgreSQL SQLSTATE into the catalog error vocabulary
pub fn map_sql_state(code: &str, detail: &str) -> CatalogError {
    match code {
        "23505" => CatalogError::AlreadyExists(Message::new(MessageId::ALREADY_EXISTS).arg(detail)),
        "23503" => CatalogError::ReferenceNotFound(
            Message::new(MessageId::REFERENCE_NOT_FOUND).arg(detail),
        ),
        "23502" => CatalogError::invalid_parameter(detail),
        "22003" | "22P02" | "22021" | "22P05" => CatalogError::conversion(code, detail),
        "57014" | "55P03" => {
            CatalogError::BackendTimeout(Message::new(MessageId::BACKEND_TIMEOUT).arg(detail))
        }
        c if c.starts_with("08") => {
            CatalogError::ConnectionError(Message::new(MessageId::CONNECT_FAILURE).arg(detail))
        }
        c => CatalogError::backend(c, detail),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Recording executor used by the statement tests

    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Query(String, Vec<SqlParam>),
        Execute(String, Vec<SqlParam>),
        Batch(String),
    }

    #[derive(Default)]
    pub struct RecordingExecutor {
        pub calls: Vec<Call>,
        pub rows: VecDeque<CatalogResult<Vec<Record>>>,
        pub affected: VecDeque<CatalogResult<u64>>,
    }

    impl RecordingExecutor {
        pub fn returning(mut self, rows: Vec<Record>) -> Self {
            self.rows.push_back(Ok(rows));
            self
        }

        pub fn affecting(mut self, n: u64) -> Self {
            self.affected.push_back(Ok(n));
            self
        }

        pub fn failing_query(mut self, err: CatalogError) -> Self {
            self.rows.push_back(Err(err));
            self
        }
    }

    impl SqlExecutor for RecordingExecutor {
        fn query(&mut self, sql: &str, params: &[SqlParam]) -> CatalogResult<Vec<Record>> {
            self.calls.push(Call::Query(sql.to_string(), params.to_vec()));
            self.rows.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }

        fn execute(&mut self, sql: &str, params: &[SqlParam]) -> CatalogResult<u64> {
            self.calls.push(Call::Execute(sql.to_string(), params.to_vec()));
            self.affected.pop_front().unwrap_or(Ok(0))
        }

        fn batch_execute(&mut self, sql: &str) -> CatalogResult<()> {
            self.calls.push(Call::Batch(sql.to_string()));
            Ok(())
        }
    }
}
