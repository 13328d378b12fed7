// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! [`SqlExecutor`] over a blocking `postgres` client

use super::executor::{map_sql_state, SqlExecutor, SqlParam};
use crate::config::PostgresConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use crate::model::Record;
use log::debug;
use postgres::types::{ToSql, Type};
use postgres::{Client, NoTls, Row, Statement};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

const SECURE_SEARCH_PATH: &str = "SELECT pg_catalog.set_config('search_path', '', false)";
const SET_STATEMENT_TIMEOUT: &str = "SELECT pg_catalog.set_config('statement_timeout', $1, false)";

/// One PostgreSQL connection with a prepared statement cache
pub struct PgExecutor {
    client: Client,
    statements: HashMap<String, Statement>,
}

impl PgExecutor {
    /// Connect and harden the session
    ///
    /// The search path is emptied so catalog statements never resolve
    /// against user schemas, and `statement_timeout` is applied.
    pub fn connect(config: &PostgresConfig) -> CatalogResult<Self> {
        let mut pg_config = postgres::Config::from_str(&config.connection_string).map_err(|e| {
            CatalogError::ConnectionError(Message::new(MessageId::CONNECT_FAILURE).arg(e))
        })?;
        if !config.connect_timeout.is_zero() {
            pg_config.connect_timeout(config.connect_timeout);
        }

        let client = pg_config.connect(NoTls).map_err(|e| match map_pg_error(&e) {
            CatalogError::BackendTimeout(m) => CatalogError::BackendTimeout(m),
            _ => CatalogError::ConnectionError(Message::new(MessageId::CONNECT_FAILURE).arg(&e)),
        })?;

        let mut executor = Self {
            client,
            statements: HashMap::new(),
        };

        executor
            .client
            .batch_execute(SECURE_SEARCH_PATH)
            .map_err(|e| {
                CatalogError::ConnectionError(
                    Message::new(MessageId::SET_ALWAYS_SECURE_SEARCH_PATH).arg(e),
                )
            })?;

        let timeout = format!("{}ms", config.statement_timeout.as_millis());
        executor.query(SET_STATEMENT_TIMEOUT, &[SqlParam::Text(Some(timeout))])?;

        debug!("PostgreSQL connection established");
        Ok(executor)
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    fn prepare(&mut self, sql: &str) -> CatalogResult<Statement> {
        if let Some(stmt) = self.statements.get(sql) {
            return Ok(stmt.clone());
        }
        let stmt = self.client.prepare(sql).map_err(|e| match map_pg_error(&e) {
            CatalogError::UnknownBackendError(_) => CatalogError::UnknownBackendError(
                Message::new(MessageId::PREPARE_FAILURE).arg(&e),
            ),
            other => other,
        })?;
        self.statements.insert(sql.to_string(), stmt.clone());
        Ok(stmt)
    }
}

impl SqlExecutor for PgExecutor {
    fn query(&mut self, sql: &str, params: &[SqlParam]) -> CatalogResult<Vec<Record>> {
        let stmt = self.prepare(sql)?;
        let bound = bind(params);
        let rows = self
            .client
            .query(&stmt, &bound)
            .map_err(|e| map_pg_error(&e))?;
        rows.iter().map(row_to_record).collect()
    }

    fn execute(&mut self, sql: &str, params: &[SqlParam]) -> CatalogResult<u64> {
        let stmt = self.prepare(sql)?;
        let bound = bind(params);
        self.client
            .execute(&stmt, &bound)
            .map_err(|e| map_pg_error(&e))
    }

    fn batch_execute(&mut self, sql: &str) -> CatalogResult<()> {
        self.client.batch_execute(sql).map_err(|e| map_pg_error(&e))
    }
}

fn bind(params: &[SqlParam]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(as_sql).collect()
}

fn as_sql(param: &SqlParam) -> &(dyn ToSql + Sync) {
    match param {
        SqlParam::Int(v) => v,
        SqlParam::Text(v) => v,
        SqlParam::Bool(v) => v,
        SqlParam::Json(v) => v,
    }
}

/// Normalize a client error into the catalog vocabulary
pub fn map_pg_error(err: &postgres::Error) -> CatalogError {
    if let Some(db) = err.as_db_error() {
        return map_sql_state(db.code().code(), db.message());
    }
    if err.is_closed() {
        return CatalogError::ConnectionError(Message::new(MessageId::NOT_CONNECT).arg(err));
    }
    let io = std::error::Error::source(err).and_then(|s| s.downcast_ref::<std::io::Error>());
    match io {
        Some(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            CatalogError::BackendTimeout(Message::new(MessageId::BACKEND_TIMEOUT).arg(err))
        }
        Some(_) => CatalogError::ConnectionError(Message::new(MessageId::CONNECT_FAILURE).arg(err)),
        None => CatalogError::UnknownBackendError(
            Message::new(MessageId::PREPARED_STATEMENT_EXECUTION_FAILURE).arg(err),
        ),
    }
}

fn row_to_record(row: &Row) -> CatalogResult<Record> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let conversion = |e: postgres::Error| CatalogError::conversion(name, e);
        let ty = column.type_();
        let value = if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx).map_err(conversion)?.map(Value::from)
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx).map_err(conversion)?.map(Value::from)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx).map_err(conversion)?.map(Value::from)
        } else if *ty == Type::OID {
            row.try_get::<_, Option<u32>>(idx).map_err(conversion)?.map(Value::from)
        } else if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx).map_err(conversion)?.map(Value::from)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            row.try_get::<_, Option<Value>>(idx).map_err(conversion)?
        } else if *ty == Type::FLOAT8 || *ty == Type::FLOAT4 {
            let f = if *ty == Type::FLOAT8 {
                row.try_get::<_, Option<f64>>(idx).map_err(conversion)?
            } else {
                row.try_get::<_, Option<f32>>(idx).map_err(conversion)?.map(f64::from)
            };
            match f {
                None => None,
                Some(f) => Some(Value::Number(serde_json::Number::from_f64(f).ok_or_else(
                    || CatalogError::conversion(name, format!("{} is not representable", f)),
                )?)),
            }
        } else if *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::NAME
            || *ty == Type::BPCHAR
        {
            row.try_get::<_, Option<String>>(idx).map_err(conversion)?.map(Value::from)
        } else {
            return Err(CatalogError::conversion(
                name,
                format!("unsupported column type {}", ty),
            ));
        };
        record.insert(name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(record)
}
