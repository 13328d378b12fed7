// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Session manager factory

use super::connection::Connector;
use super::json::JsonConnector;
use super::manager::DbSessionManager;
use crate::config::{BackendKind, CatalogConfig};
use crate::error::CatalogResult;

/// Build the connector for the configured backend
pub fn create_connector(config: &CatalogConfig) -> CatalogResult<Box<dyn Connector>> {
    match config.backend {
        BackendKind::Json => Ok(Box::new(JsonConnector::new(&config.json, &config.database))),
        #[cfg(feature = "postgresql")]
        BackendKind::Postgresql => Ok(Box::new(super::postgresql::PgConnector::new(
            &config.postgresql,
        ))),
        #[cfg(not(feature = "postgresql"))]
        BackendKind::Postgresql => Err(crate::error::CatalogError::not_supported(
            "PostgreSQL backend (built without the `postgresql` feature)",
        )),
    }
}

/// Build a session manager for the configured backend
///
/// The backend is fixed for the lifetime of the returned manager.
pub fn create_session_manager(config: &CatalogConfig) -> CatalogResult<DbSessionManager> {
    let connector = create_connector(config)?;
    Ok(DbSessionManager::new(connector, config.pool.max_idle_sessions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_session_manager() {
        let dir = TempDir::new().unwrap();
        let sm = create_session_manager(&CatalogConfig::json(dir.path())).unwrap();
        assert_eq!(sm.backend(), BackendKind::Json);

        let mut session = sm.acquire_session().unwrap();
        sm.start_transaction(&mut session).unwrap();
        sm.commit(&mut session).unwrap();
        sm.release(session);
        assert_eq!(sm.idle_count(), 1);
        assert!(dir.path().join("tsurugi.json").exists());
    }

    #[cfg(feature = "postgresql")]
    #[test]
    fn test_postgresql_connector_is_lazy() {
        let sm = create_session_manager(&CatalogConfig::postgresql("host=127.0.0.1 port=1"))
            .unwrap();
        assert_eq!(sm.backend(), BackendKind::Postgresql);
        assert_eq!(sm.idle_count(), 0);
    }
}
