// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Role metadata provider
//!
//! On PostgreSQL roles come straight from `pg_catalog.pg_roles` and are
//! read-only; writes fail with `NotSupported`. The JSON backend keeps its
//! own role list, so roles can be added and removed there.

use super::base::{from_records, ProviderCore};
use crate::dao::schema::{ID, NAME};
use crate::error::{CatalogError, CatalogResult};
use crate::message::Status;
use crate::model::{MetadataKind, MetadataObject, ObjectId, Role};
use serde_json::Value;

pub struct RolesProvider {
    core: ProviderCore,
}

impl RolesProvider {
    pub fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    pub fn get_role(&self, id: ObjectId) -> (Option<Role>, Status) {
        self.find(ID, Value::from(id))
    }

    pub fn get_role_by_name(&self, name: &str) -> (Option<Role>, Status) {
        self.find(NAME, Value::from(name))
    }

    fn find(&self, key: &str, value: Value) -> (Option<Role>, Status) {
        let result = self.core.transaction(|s| {
            let record = s.dao(MetadataKind::Role)?.select_one(key, &value)?;
            Role::from_record(record)
        });
        self.core.reply(result)
    }

    pub fn get_roles(&self) -> (Option<Vec<Role>>, Status) {
        let result = self
            .core
            .transaction(|s| from_records(s.dao(MetadataKind::Role)?.select_all()?));
        self.core.reply(result)
    }

    pub fn add_role(&self, role: &Role) -> (Option<ObjectId>, Status) {
        let result = self
            .core
            .transaction(|s| s.dao(MetadataKind::Role)?.insert(&role.to_record()?));
        self.core.reply(result)
    }

    pub fn remove_role_by_name(&self, name: &str) -> (Option<u64>, Status) {
        let result: CatalogResult<u64> = self.core.transaction(|s| {
            let removed = s
                .dao(MetadataKind::Role)?
                .delete(NAME, &Value::from(name))?;
            if removed == 0 {
                return Err(CatalogError::not_found(MetadataKind::Role.node(), NAME, name));
            }
            Ok(removed)
        });
        self.core.reply(result)
    }
}
