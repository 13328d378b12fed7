// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! JSON file backend connections
//!
//! A transaction on a metadata file holds that file's writer lock from
//! `begin` until `commit` or `rollback`. `begin` loads the file into a
//! private buffer, DAOs edit the buffer, and `commit` atomically replaces
//! the file with it. A transaction that changed nothing leaves the file
//! untouched. Transactions on one file are serialized within the process.

use super::connection::{BackendConnection, Connector};
use crate::config::{BackendKind, JsonConfig};
use crate::dao::json::{JsonDao, MetadataDocument};
use crate::dao::schema::schema;
use crate::dao::MetadataDao;
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use crate::model::MetadataKind;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Writer lock for one metadata file
#[derive(Default)]
struct FileLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl FileLock {
    /// Wait up to `timeout` for the lock; a timeout too large to express
    /// as a deadline waits indefinitely
    fn acquire(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut held = self.held.lock();
        while *held {
            match deadline {
                Some(deadline) => {
                    if self.released.wait_until(&mut held, deadline).timed_out() && *held {
                        return false;
                    }
                }
                None => self.released.wait(&mut held),
            }
        }
        *held = true;
        true
    }

    fn release(&self) {
        *self.held.lock() = false;
        self.released.notify_one();
    }
}

/// Process-wide registry of file locks keyed by canonical path
static FILE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<FileLock>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn file_lock(path: &Path) -> Arc<FileLock> {
    FILE_LOCKS
        .lock()
        .entry(path.to_path_buf())
        .or_default()
        .clone()
}

/// Holds a file lock until dropped
struct LockGuard(Arc<FileLock>);

impl LockGuard {
    fn acquire(lock: Arc<FileLock>, path: &Path, timeout: Duration) -> CatalogResult<Self> {
        if lock.acquire(timeout) {
            Ok(LockGuard(lock))
        } else {
            Err(CatalogError::BackendTimeout(
                Message::new(MessageId::BACKEND_TIMEOUT).arg(format!(
                    "waiting {:?} for the lock on {}",
                    timeout,
                    path.display()
                )),
            ))
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}

fn connect_failure(path: &Path, detail: impl std::fmt::Display) -> CatalogError {
    CatalogError::ConnectionError(
        Message::new(MessageId::CONNECT_FAILURE).arg(format!("{}: {}", path.display(), detail)),
    )
}

/// Opens connections to `<metadata_dir>/<database>.json`
pub struct JsonConnector {
    dir: PathBuf,
    file_name: String,
    create_if_missing: bool,
    lock_timeout: Duration,
}

impl JsonConnector {
    pub fn new(config: &JsonConfig, database: &str) -> Self {
        Self {
            dir: config.metadata_dir.clone(),
            file_name: format!("{}.json", database),
            create_if_missing: config.create_if_missing,
            lock_timeout: config.lock_timeout,
        }
    }

    /// Check the directory and resolve the file path, creating a seeded
    /// document if allowed
    fn prepare_file(&self) -> CatalogResult<PathBuf> {
        let meta = std::fs::metadata(&self.dir).map_err(|e| connect_failure(&self.dir, e))?;
        if !meta.is_dir() {
            return Err(connect_failure(&self.dir, "not a directory"));
        }
        if meta.permissions().readonly() {
            return Err(connect_failure(&self.dir, "directory is not writable"));
        }
        let dir = self
            .dir
            .canonicalize()
            .map_err(|e| connect_failure(&self.dir, e))?;
        let path = dir.join(&self.file_name);

        if !path.exists() {
            if !self.create_if_missing {
                return Err(connect_failure(&path, "metadata file does not exist"));
            }
            let _guard = LockGuard::acquire(file_lock(&path), &path, self.lock_timeout)?;
            if !path.exists() {
                MetadataDocument::seeded()?
                    .save(&path)
                    .map_err(|e| connect_failure(&path, e.message()))?;
                debug!("Created metadata file {}", path.display());
            }
        } else if std::fs::metadata(&path)
            .map(|m| m.permissions().readonly())
            .unwrap_or(true)
        {
            return Err(connect_failure(&path, "metadata file is not writable"));
        }
        Ok(path)
    }
}

impl Connector for JsonConnector {
    fn backend(&self) -> BackendKind {
        BackendKind::Json
    }

    fn connect(&self) -> CatalogResult<Box<dyn BackendConnection>> {
        let path = self.prepare_file()?;
        Ok(Box::new(JsonConnection {
            lock: file_lock(&path),
            path,
            lock_timeout: self.lock_timeout,
            txn: None,
        }))
    }
}

/// Transaction-private state: the held lock and the document buffer
struct OpenTransaction {
    _guard: LockGuard,
    buffer: MetadataDocument,
}

pub struct JsonConnection {
    path: PathBuf,
    lock: Arc<FileLock>,
    lock_timeout: Duration,
    txn: Option<OpenTransaction>,
}

impl JsonConnection {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_transaction(&mut self) -> CatalogResult<&mut OpenTransaction> {
        self.txn.as_mut().ok_or_else(|| {
            CatalogError::invalid_state(format!("no transaction open on {}", self.path.display()))
        })
    }
}

impl BackendConnection for JsonConnection {
    fn backend(&self) -> BackendKind {
        BackendKind::Json
    }

    fn begin(&mut self) -> CatalogResult<()> {
        if self.txn.is_some() {
            return Err(CatalogError::invalid_state("transaction already open"));
        }
        let guard = LockGuard::acquire(self.lock.clone(), &self.path, self.lock_timeout)?;
        let buffer = MetadataDocument::load(&self.path)?;
        self.txn = Some(OpenTransaction {
            _guard: guard,
            buffer,
        });
        Ok(())
    }

    fn commit(&mut self) -> CatalogResult<()> {
        // Taking the transaction releases the lock on every path
        let txn = self
            .txn
            .take()
            .ok_or_else(|| CatalogError::invalid_state("commit without transaction"))?;
        if !txn.buffer.is_dirty() {
            debug!("Nothing changed in {}, skipping write", self.path.display());
            return Ok(());
        }
        txn.buffer.save(&self.path)
    }

    fn rollback(&mut self) -> CatalogResult<()> {
        self.txn
            .take()
            .map(|_| ())
            .ok_or_else(|| CatalogError::invalid_state("rollback without transaction"))
    }

    fn dao(&mut self, kind: MetadataKind) -> CatalogResult<Box<dyn MetadataDao + '_>> {
        let txn = self.open_transaction()?;
        Ok(Box::new(JsonDao::new(schema(kind), &mut txn.buffer)))
    }

    fn is_valid(&mut self) -> bool {
        self.path.parent().map_or(false, Path::is_dir)
    }
}
