// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Shared provider machinery
//!
//! Every provider operation runs as one transaction through
//! [`ProviderCore::transaction`]: lease a session, begin, run the
//! operation, then commit or roll back. The session goes back to the
//! manager on every exit path.

use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageBroker, Status};
use crate::model::{MetadataObject, Record};
use crate::session::{DbSessionManager, Session};
use log::{debug, warn};
use std::sync::Arc;

/// A session borrowed from the manager, returned when dropped
struct SessionLease<'a> {
    manager: &'a DbSessionManager,
    session: Option<Session>,
}

impl<'a> SessionLease<'a> {
    fn acquire(manager: &'a DbSessionManager) -> CatalogResult<Self> {
        Ok(Self {
            manager,
            session: Some(manager.acquire_session()?),
        })
    }

    fn session(&mut self) -> CatalogResult<&mut Session> {
        self.session
            .as_mut()
            .ok_or_else(|| CatalogError::invalid_state("session already released"))
    }
}

impl Drop for SessionLease<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.manager.release(session);
        }
    }
}

#[derive(Clone)]
pub struct ProviderCore {
    sessions: Arc<DbSessionManager>,
    broker: Arc<MessageBroker>,
}

impl ProviderCore {
    pub fn new(sessions: Arc<DbSessionManager>, broker: Arc<MessageBroker>) -> Self {
        Self { sessions, broker }
    }

    pub fn sessions(&self) -> &Arc<DbSessionManager> {
        &self.sessions
    }

    pub fn broker(&self) -> &Arc<MessageBroker> {
        &self.broker
    }

    /// Run `op` inside one transaction
    ///
    /// Commits when `op` succeeds. Otherwise rolls back and returns the
    /// first error unchanged; a failing rollback is only logged.
    pub fn transaction<T>(
        &self,
        op: impl FnOnce(&mut Session) -> CatalogResult<T>,
    ) -> CatalogResult<T> {
        let mut lease = SessionLease::acquire(&self.sessions)?;
        let session = lease.session()?;
        self.sessions.start_transaction(session)?;

        match op(session) {
            Ok(value) => {
                self.sessions.commit(session)?;
                Ok(value)
            }
            Err(e) => {
                debug!("Rolling back after error: {}", e);
                if e.invalidates_session() {
                    session.mark_broken();
                }
                if let Err(rollback_err) = self.sessions.rollback(session) {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Convert an operation result into the provider reply shape
    ///
    /// Errors are reported through the broker so they are logged once.
    pub fn reply<T>(&self, result: CatalogResult<T>) -> (Option<T>, Status) {
        match result {
            Ok(value) => (Some(value), Status::ok()),
            Err(e) => (None, self.broker.report(&e)),
        }
    }

    /// Publish an event after a successful commit
    ///
    /// The mutation already took effect, so a receiver failure is logged and
    /// does not change the operation's status.
    pub fn publish(&self, message: Message) {
        let status = self.broker.send_message(&message);
        if !status.is_ok() {
            warn!("Event {} was not accepted: {}", message.id(), status);
        }
    }
}

pub(crate) fn from_records<T: MetadataObject>(records: Vec<Record>) -> CatalogResult<Vec<T>> {
    records.into_iter().map(T::from_record).collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::session::create_session_manager;
    use tempfile::TempDir;

    /// A provider core over a fresh JSON catalog in a temporary directory
    pub(crate) fn json_core() -> (ProviderCore, TempDir) {
        let dir = TempDir::new().unwrap();
        let sm = create_session_manager(&CatalogConfig::json(dir.path())).unwrap();
        (
            ProviderCore::new(Arc::new(sm), Arc::new(MessageBroker::new())),
            dir,
        )
    }
}
