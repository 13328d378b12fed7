// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog entry point

use crate::config::{BackendKind, CatalogConfig};
use crate::error::{CatalogError, CatalogResult};
use crate::message::MessageBroker;
use crate::provider::{
    ConstraintsProvider, DataTypesProvider, IndexesProvider, PrivilegesProvider, ProviderCore,
    RolesProvider, StatisticsProvider, TablesProvider,
};
use crate::session::{create_session_manager, DbSessionManager};
use log::info;
use std::sync::Arc;

/// Catalog manager - owns the session manager and the message broker and
/// hands out the per-kind providers
///
/// All providers share one session pool, so a manager can be shared across
/// threads behind an `Arc`.
pub struct CatalogManager {
    tables: TablesProvider,
    constraints: ConstraintsProvider,
    data_types: DataTypesProvider,
    roles: RolesProvider,
    statistics: StatisticsProvider,
    indexes: IndexesProvider,
    privileges: PrivilegesProvider,
    core: ProviderCore,
}

impl CatalogManager {
    /// Create a catalog manager for the configured backend
    ///
    /// # Example
    /// ```no_run
    /// use metadata_manager::{CatalogConfig, CatalogManager, Table};
    ///
    /// let catalog = CatalogManager::new(&CatalogConfig::json("/tmp/metadata"))
    ///     .expect("Failed to open catalog");
    /// let (id, status) = catalog.tables().add_table(&Table::new("orders"));
    /// assert!(status.is_ok());
    /// ```
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let sessions = create_session_manager(config)?;
        info!(
            "Catalog '{}' opened on {} backend",
            config.database, config.backend
        );
        Ok(Self::with_session_manager(
            Arc::new(sessions),
            Arc::new(MessageBroker::new()),
        ))
    }

    /// Create a catalog manager from `TSURUGI_*` environment variables
    pub fn from_env() -> CatalogResult<Self> {
        let config = CatalogConfig::from_env().map_err(CatalogError::invalid_parameter)?;
        Self::new(&config)
    }

    /// Create a catalog manager over existing components
    pub fn with_session_manager(sessions: Arc<DbSessionManager>, broker: Arc<MessageBroker>) -> Self {
        let core = ProviderCore::new(sessions, broker);
        Self {
            tables: TablesProvider::new(core.clone()),
            constraints: ConstraintsProvider::new(core.clone()),
            data_types: DataTypesProvider::new(core.clone()),
            roles: RolesProvider::new(core.clone()),
            statistics: StatisticsProvider::new(core.clone()),
            indexes: IndexesProvider::new(core.clone()),
            privileges: PrivilegesProvider::new(core.clone()),
            core,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.core.sessions().backend()
    }

    pub fn tables(&self) -> &TablesProvider {
        &self.tables
    }

    pub fn constraints(&self) -> &ConstraintsProvider {
        &self.constraints
    }

    pub fn data_types(&self) -> &DataTypesProvider {
        &self.data_types
    }

    pub fn roles(&self) -> &RolesProvider {
        &self.roles
    }

    pub fn statistics(&self) -> &StatisticsProvider {
        &self.statistics
    }

    pub fn indexes(&self) -> &IndexesProvider {
        &self.indexes
    }

    pub fn privileges(&self) -> &PrivilegesProvider {
        &self.privileges
    }

    /// Broker for subscribing message receivers
    pub fn broker(&self) -> &Arc<MessageBroker> {
        self.core.broker()
    }

    pub fn session_manager(&self) -> &Arc<DbSessionManager> {
        self.core.sessions()
    }
}

impl std::fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogManager")
            .field("backend", &self.backend())
            .field("sessions", self.core.sessions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, MessageId, MessageReceiver, Status};
    use crate::model::{Index, Table};
    use parking_lot::Mutex;
    use tempfile::TempDir;

    struct EventLog {
        events: Mutex<Vec<(MessageId, Vec<String>)>>,
        reply: Status,
    }

    impl MessageReceiver for EventLog {
        fn name(&self) -> &str {
            "oltp"
        }

        fn receive_message(&self, message: &Message) -> Status {
            self.events
                .lock()
                .push((message.id(), message.args().to_vec()));
            self.reply.clone()
        }
    }

    #[test]
    fn test_json_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = CatalogManager::new(&CatalogConfig::json(dir.path())).unwrap();
        assert_eq!(catalog.backend(), BackendKind::Json);
        assert!(catalog.data_types().get_data_types().1.is_ok());
        assert!(catalog.tables().get_tables().0.unwrap().is_empty());
    }

    #[test]
    fn test_table_events_reach_receivers() {
        let dir = TempDir::new().unwrap();
        let catalog = CatalogManager::new(&CatalogConfig::json(dir.path())).unwrap();
        let log = Arc::new(EventLog {
            events: Mutex::new(Vec::new()),
            reply: Status::ok(),
        });
        catalog.broker().subscribe(log.clone());

        let id = catalog.tables().add_table(&Table::new("t")).0.unwrap();
        catalog.indexes().add_index(&Index::new("t_i", id));
        catalog.tables().remove_table(id);
        // failed operations publish nothing
        catalog.tables().remove_table(id);

        let events = log.events.lock();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], (MessageId::CREATE_TABLE, vec![id.to_string()]));
        assert_eq!(events[1], (MessageId::ALTER_TABLE, vec![id.to_string()]));
        assert_eq!(events[2].0, MessageId::DROP_TABLE);
    }

    #[test]
    fn test_receiver_failure_does_not_fail_the_operation() {
        let dir = TempDir::new().unwrap();
        let catalog = CatalogManager::new(&CatalogConfig::json(dir.path())).unwrap();
        catalog.broker().subscribe(Arc::new(EventLog {
            events: Mutex::new(Vec::new()),
            reply: Status::from_error(&CatalogError::not_supported("oltp offline")),
        }));

        let (id, status) = catalog.tables().add_table(&Table::new("t"));
        assert!(status.is_ok());
        assert!(catalog.tables().get_table(id.unwrap()).1.is_ok());
    }
}
