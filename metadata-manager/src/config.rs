// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Metadata manager configuration
//!
//! Settings are plain serde structs with defaults. [`CatalogConfig::from_env`]
//! overlays the environment variables understood by the catalog tools.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_CONNECTION_STRING: &str = "TSURUGI_CONNECTION_STRING";
pub const ENV_METADATA_DIR: &str = "TSURUGI_METADATA_DIR";
pub const ENV_METADATA_BACKEND: &str = "TSURUGI_METADATA_BACKEND";

const DEFAULT_DATABASE: &str = "tsurugi";
const DEFAULT_CONNECTION_STRING: &str = "dbname=tsurugi";

/// Storage backend holding the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// PostgreSQL database
    Postgresql,

    /// One JSON document per database
    Json,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "postgresql") {
            BackendKind::Postgresql
        } else {
            BackendKind::Json
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(BackendKind::Postgresql),
            "json" => Ok(BackendKind::Json),
            _ => Err(format!(
                "Unknown metadata backend: {}. Valid options: postgresql, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendKind::Postgresql => "postgresql",
            BackendKind::Json => "json",
        };
        write!(f, "{}", name)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub backend: BackendKind,

    /// Database whose catalog is managed. Names the JSON document.
    pub database: String,

    pub postgresql: PostgresConfig,

    pub json: JsonConfig,

    pub pool: PoolConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database: DEFAULT_DATABASE.to_string(),
            postgresql: PostgresConfig::default(),
            json: JsonConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// JSON backend configuration rooted at `dir`
    pub fn json(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Json,
            json: JsonConfig {
                metadata_dir: dir.into(),
                ..JsonConfig::default()
            },
            ..Self::default()
        }
    }

    /// PostgreSQL backend configuration using `connection_string`
    pub fn postgresql(connection_string: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Postgresql,
            postgresql: PostgresConfig {
                connection_string: connection_string.into(),
                ..PostgresConfig::default()
            },
            ..Self::default()
        }
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(conn) = lookup(ENV_CONNECTION_STRING).filter(|v| !v.is_empty()) {
            config.postgresql.connection_string = conn;
        }
        if let Some(dir) = lookup(ENV_METADATA_DIR).filter(|v| !v.is_empty()) {
            config.json.metadata_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup(ENV_METADATA_BACKEND).filter(|v| !v.is_empty()) {
            config.backend = backend.parse()?;
        }
        Ok(config)
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// libpq-style connection string
    pub connection_string: String,

    pub connect_timeout: Duration,

    /// Applied to every statement via `statement_timeout`; zero disables it
    pub statement_timeout: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            connection_string: DEFAULT_CONNECTION_STRING.to_string(),
            connect_timeout: Duration::from_secs(10),
            statement_timeout: Duration::from_secs(30),
        }
    }
}

/// JSON file backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    pub metadata_dir: PathBuf,

    /// Create a seeded document when the database file does not exist
    pub create_if_missing: bool,

    /// Maximum wait for the per-file writer lock
    pub lock_timeout: Duration,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            metadata_dir: default_metadata_dir(),
            create_if_missing: true,
            lock_timeout: Duration::from_secs(10),
        }
    }
}

/// Idle session pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_idle_sessions: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_sessions: 8,
        }
    }
}

fn default_metadata_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".local").join("tsurugi").join("metadata")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("json".parse::<BackendKind>(), Ok(BackendKind::Json));
        assert_eq!("PostgreSQL".parse::<BackendKind>(), Ok(BackendKind::Postgresql));
        assert!("sqlite".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Json.to_string(), "json");
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.database, "tsurugi");
        assert_eq!(config.postgresql.connection_string, "dbname=tsurugi");
        assert!(config.json.create_if_missing);
        assert!(config.json.metadata_dir.ends_with(".local/tsurugi/metadata"));
    }

    #[test]
    fn test_environment_overlay() {
        let env: HashMap<&str, &str> = [
            (ENV_CONNECTION_STRING, "host=db dbname=catalog"),
            (ENV_METADATA_DIR, "/var/lib/catalog"),
            (ENV_METADATA_BACKEND, "json"),
        ]
        .into_iter()
        .collect();
        let config =
            CatalogConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.backend, BackendKind::Json);
        assert_eq!(config.postgresql.connection_string, "host=db dbname=catalog");
        assert_eq!(config.json.metadata_dir, PathBuf::from("/var/lib/catalog"));
    }

    #[test]
    fn test_environment_rejects_unknown_backend() {
        let result = CatalogConfig::from_lookup(|k| {
            (k == ENV_METADATA_BACKEND).then(|| "oracle".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"backend":"json","database":"db1"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::Json);
        assert_eq!(config.database, "db1");
        assert_eq!(config.pool.max_idle_sessions, 8);
    }
}
