// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Session manager with an idle session pool
//!
//! Sessions are handed out by value and must be given back through
//! [`DbSessionManager::release`]. The idle pool is the only state shared
//! between callers.

use super::connection::Connector;
use super::session::{Session, TransactionId, TransactionState};
use crate::config::BackendKind;
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use chrono::Utc;
use log::{debug, warn};
use parking_lot::Mutex;

pub struct DbSessionManager {
    connector: Box<dyn Connector>,
    idle: Mutex<Vec<Session>>,
    max_idle: usize,
}

impl DbSessionManager {
    pub fn new(connector: Box<dyn Connector>, max_idle: usize) -> Self {
        Self {
            connector,
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.connector.backend()
    }

    /// Hand out an idle session, or open a new connection
    pub fn acquire_session(&self) -> CatalogResult<Session> {
        loop {
            let pooled = self.idle.lock().pop();
            match pooled {
                Some(mut session) => {
                    if session.connection_mut().is_valid() {
                        debug!("Reusing session {}", session.id());
                        return Ok(session);
                    }
                    debug!("Discarding invalid idle session {}", session.id());
                }
                None => break,
            }
        }

        let session = Session::new(self.connector.connect()?);
        debug!(
            "Opened {} session {}",
            self.connector.backend(),
            session.id()
        );
        Ok(session)
    }

    /// Begin a transaction on `session`
    ///
    /// Fails with `TransactionStartFailure` if one is already open or the
    /// backend rejects the begin. Connection loss and timeouts keep their
    /// own kind and mark the session broken.
    pub fn start_transaction(&self, session: &mut Session) -> CatalogResult<TransactionId> {
        if let Some(txn) = session.transaction() {
            return Err(CatalogError::TransactionStartFailure(
                Message::new(MessageId::START_TRANSACTION_FAILURE)
                    .arg(format!("{} already active on session {}", txn.id, session.id())),
            ));
        }

        if let Err(e) = session.connection_mut().begin() {
            if e.invalidates_session() {
                session.mark_broken();
                return Err(e);
            }
            return Err(CatalogError::TransactionStartFailure(
                Message::new(MessageId::START_TRANSACTION_FAILURE).arg(e.message()),
            ));
        }

        let id = TransactionId::next();
        session.set_transaction(Some(TransactionState {
            id,
            started_at: Utc::now(),
            operations: 0,
        }));
        debug!("Started {} on session {}", id, session.id());
        Ok(id)
    }

    /// Commit the open transaction. The transaction is over afterwards
    /// whether or not the commit succeeded.
    pub fn commit(&self, session: &mut Session) -> CatalogResult<()> {
        let txn = session.set_transaction(None).ok_or_else(|| {
            CatalogError::invalid_state(format!(
                "commit without transaction on session {}",
                session.id()
            ))
        })?;

        match session.connection_mut().commit() {
            Ok(()) => {
                debug!(
                    "Committed {} on session {} ({} operations)",
                    txn.id,
                    session.id(),
                    txn.operations
                );
                Ok(())
            }
            Err(e) => {
                if e.invalidates_session() {
                    session.mark_broken();
                }
                Err(e)
            }
        }
    }

    pub fn rollback(&self, session: &mut Session) -> CatalogResult<()> {
        let txn = session.set_transaction(None).ok_or_else(|| {
            CatalogError::invalid_state(format!(
                "rollback without transaction on session {}",
                session.id()
            ))
        })?;

        match session.connection_mut().rollback() {
            Ok(()) => {
                debug!("Rolled back {} on session {}", txn.id, session.id());
                Ok(())
            }
            Err(e) => {
                // The connection state is unknown after a failed rollback
                session.mark_broken();
                Err(e)
            }
        }
    }

    /// Return a session to the pool
    ///
    /// An open transaction is rolled back first. Broken or invalid sessions,
    /// and sessions beyond the pool bound, are closed.
    pub fn release(&self, mut session: Session) {
        if session.in_transaction() {
            warn!(
                "Session {} released with an open transaction; rolling back",
                session.id()
            );
            if let Err(e) = self.rollback(&mut session) {
                warn!("Rollback on release failed: {}", e);
            }
        }

        if session.is_broken() || !session.connection_mut().is_valid() {
            debug!("Discarding session {}", session.id());
            return;
        }

        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(session);
        } else {
            debug!("Idle pool full; closing session {}", session.id());
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

impl std::fmt::Debug for DbSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSessionManager")
            .field("backend", &self.backend())
            .field("idle", &self.idle_count())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory connector whose failures can be scripted

    use super::*;
    use crate::dao::json::{JsonDao, MetadataDocument};
    use crate::dao::schema::schema;
    use crate::dao::MetadataDao;
    use crate::model::MetadataKind;
    use crate::session::connection::BackendConnection;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    pub struct Script {
        pub fail_begin: Mutex<Option<CatalogError>>,
        pub fail_commit: Mutex<Option<CatalogError>>,
        pub invalid: AtomicBool,
        pub connects: AtomicUsize,
        pub commits: AtomicUsize,
        pub rollbacks: AtomicUsize,
    }

    pub struct FakeConnector(pub Arc<Script>);

    struct FakeConnection {
        script: Arc<Script>,
        doc: MetadataDocument,
    }

    impl Connector for FakeConnector {
        fn backend(&self) -> BackendKind {
            BackendKind::Json
        }

        fn connect(&self) -> CatalogResult<Box<dyn BackendConnection>> {
            self.0.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeConnection {
                script: self.0.clone(),
                doc: MetadataDocument::default(),
            }))
        }
    }

    impl BackendConnection for FakeConnection {
        fn backend(&self) -> BackendKind {
            BackendKind::Json
        }

        fn begin(&mut self) -> CatalogResult<()> {
            match self.script.fail_begin.lock().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn commit(&mut self) -> CatalogResult<()> {
            self.script.commits.fetch_add(1, Ordering::SeqCst);
            match self.script.fail_commit.lock().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn rollback(&mut self) -> CatalogResult<()> {
            self.script.rollbacks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn dao(&mut self, kind: MetadataKind) -> CatalogResult<Box<dyn MetadataDao + '_>> {
            Ok(Box::new(JsonDao::new(schema(kind), &mut self.doc)))
        }

        fn is_valid(&mut self) -> bool {
            !self.script.invalid.load(Ordering::SeqCst)
        }
    }

    pub fn manager(max_idle: usize) -> (DbSessionManager, Arc<Script>) {
        let script = Arc::new(Script::default());
        (
            DbSessionManager::new(Box::new(FakeConnector(script.clone())), max_idle),
            script,
        )
    }
}
