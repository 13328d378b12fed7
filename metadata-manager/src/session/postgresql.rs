// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! PostgreSQL backend connections

use super::connection::{BackendConnection, Connector};
use crate::config::{BackendKind, PostgresConfig};
use crate::dao::postgresql::{install_schema, PgDao, PgExecutor, SqlExecutor};
use crate::dao::schema::schema;
use crate::dao::MetadataDao;
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use crate::model::MetadataKind;

pub struct PgConnector {
    config: PostgresConfig,
}

impl PgConnector {
    pub fn new(config: &PostgresConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Create the catalog schema on the configured database
    pub fn install_schema(&self) -> CatalogResult<()> {
        let mut executor = PgExecutor::connect(&self.config)?;
        install_schema(&mut executor)
    }
}

impl Connector for PgConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::Postgresql
    }

    fn connect(&self) -> CatalogResult<Box<dyn BackendConnection>> {
        Ok(Box::new(PgConnection {
            executor: PgExecutor::connect(&self.config)?,
        }))
    }
}

pub struct PgConnection {
    executor: PgExecutor,
}

impl BackendConnection for PgConnection {
    fn backend(&self) -> BackendKind {
        BackendKind::Postgresql
    }

    fn begin(&mut self) -> CatalogResult<()> {
        self.executor.batch_execute("BEGIN")
    }

    fn commit(&mut self) -> CatalogResult<()> {
        self.executor.batch_execute("COMMIT").map_err(|e| match e {
            CatalogError::UnknownBackendError(m) => {
                CatalogError::UnknownBackendError(Message::new(MessageId::COMMIT_FAILURE).arg(m))
            }
            other => other,
        })
    }

    fn rollback(&mut self) -> CatalogResult<()> {
        self.executor.batch_execute("ROLLBACK").map_err(|e| match e {
            CatalogError::UnknownBackendError(m) => {
                CatalogError::UnknownBackendError(Message::new(MessageId::ROLLBACK_FAILURE).arg(m))
            }
            other => other,
        })
    }

    fn dao(&mut self, kind: MetadataKind) -> CatalogResult<Box<dyn MetadataDao + '_>> {
        Ok(Box::new(PgDao::new(schema(kind), &mut self.executor)))
    }

    fn is_valid(&mut self) -> bool {
        !self.executor.is_closed()
    }
}
