// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog session and its transaction state

use super::connection::BackendConnection;
use crate::config::BackendKind;
use crate::dao::MetadataDao;
use crate::error::{CatalogError, CatalogResult};
use crate::model::MetadataKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn next() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

/// State of the transaction open on a session
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub id: TransactionId,
    pub started_at: DateTime<Utc>,
    /// DAOs handed out within this transaction
    pub operations: u64,
}

/// One live connection to a backend, owned by one caller at a time
pub struct Session {
    id: Uuid,
    connection: Box<dyn BackendConnection>,
    transaction: Option<TransactionState>,
    broken: bool,
    created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(connection: Box<dyn BackendConnection>) -> Self {
        Self {
            id: Uuid::new_v4(),
            connection,
            transaction: None,
            broken: false,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn backend(&self) -> BackendKind {
        self.connection.backend()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn transaction(&self) -> Option<&TransactionState> {
        self.transaction.as_ref()
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Mark the connection state unknown; the session will not be pooled
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// DAO for `kind` within the open transaction
    pub fn dao(&mut self, kind: MetadataKind) -> CatalogResult<Box<dyn MetadataDao + '_>> {
        match self.transaction.as_mut() {
            Some(txn) => {
                txn.operations += 1;
                self.connection.dao(kind)
            }
            None => Err(CatalogError::invalid_state(format!(
                "no active transaction on session {} for {}",
                self.id, kind
            ))),
        }
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Box<dyn BackendConnection> {
        &mut self.connection
    }

    pub(crate) fn set_transaction(&mut self, state: Option<TransactionState>) -> Option<TransactionState> {
        std::mem::replace(&mut self.transaction, state)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("backend", &self.backend())
            .field("transaction", &self.transaction)
            .field("broken", &self.broken)
            .finish()
    }
}
