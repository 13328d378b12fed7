// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table privilege queries
//!
//! A role holds every privilege on the tables it owns, and on all tables if
//! it is a superuser. Other privileges come from the table `acl` items
//! granted to the role by name or to PUBLIC.

use super::base::{from_records, ProviderCore};
use crate::dao::schema::{ID, NAME};
use crate::error::{CatalogError, CatalogResult};
use crate::message::Status;
use crate::model::privilege::{acl_items, parse_permission};
use crate::model::{MetadataKind, MetadataObject, Role, Table, TablePrivileges};
use crate::session::Session;
use serde_json::Value;

pub struct PrivilegesProvider {
    core: ProviderCore,
}

impl PrivilegesProvider {
    pub fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    /// Privileges of the role matching `key` (`id` or `name`) on every table
    ///
    /// Fails with `NotFound` if the role does not exist or there are no
    /// tables.
    pub fn get_privileges(&self, key: &str, value: &Value) -> (Option<Vec<TablePrivileges>>, Status) {
        let result = self.core.transaction(|s| role_privileges(s, key, value));
        self.core.reply(result)
    }

    /// Whether the role holds `permission` on every table
    ///
    /// `permission` is a string of aclitem letters (`rawdDxt`), optionally
    /// written as a full `grantee=letters/grantor` item.
    pub fn confirm_permission(&self, key: &str, value: &Value, permission: &str) -> (Option<bool>, Status) {
        let result = parse_permission(permission).and_then(|wanted| {
            self.core.transaction(|s| {
                let privileges = role_privileges(s, key, value)?;
                Ok(privileges.iter().all(|p| p.has_all(&wanted)))
            })
        });
        self.core.reply(result)
    }
}

fn role_privileges(s: &mut Session, key: &str, value: &Value) -> CatalogResult<Vec<TablePrivileges>> {
    if key != ID && key != NAME {
        return Err(CatalogError::invalid_parameter(format!(
            "roles are looked up by {} or {}, not {}",
            ID, NAME, key
        )));
    }
    let role = Role::from_record(s.dao(MetadataKind::Role)?.select_one(key, value)?)?;
    let tables: Vec<Table> = from_records(s.dao(MetadataKind::Table)?.select_all()?)?;
    if tables.is_empty() {
        return Err(CatalogError::not_found(MetadataKind::Table.node(), "role", &role.name));
    }
    Ok(tables.iter().map(|t| table_privileges(&role, t)).collect())
}

fn table_privileges(role: &Role, table: &Table) -> TablePrivileges {
    let mut privileges = TablePrivileges::none(table.id.unwrap_or_default(), &table.name);
    let owner = role.id.is_some() && table.owner_role_id == role.id;
    if owner || role.superuser == Some(true) {
        privileges.grant_all();
        return privileges;
    }
    for item in acl_items(table.acl.as_ref()) {
        if item.applies_to(&role.name) {
            for p in item.privileges {
                privileges.grant(p);
            }
        }
    }
    privileges
}
