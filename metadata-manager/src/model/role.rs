// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Role metadata

use super::{default_format_version, default_generation, MetadataKind, MetadataObject, ObjectId};
use serde::{Deserialize, Serialize};

/// Role metadata, shaped after PostgreSQL's `pg_roles`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default = "default_format_version")]
    pub format_version: i64,
    #[serde(default = "default_generation")]
    pub generation: i64,
    pub name: String,
    #[serde(rename = "rolsuper", default)]
    pub superuser: Option<bool>,
    #[serde(rename = "rolinherit", default)]
    pub inherit: Option<bool>,
    #[serde(rename = "rolcreaterole", default)]
    pub create_role: Option<bool>,
    #[serde(rename = "rolcreatedb", default)]
    pub create_db: Option<bool>,
    #[serde(rename = "rolcanlogin", default)]
    pub can_login: Option<bool>,
    #[serde(rename = "rolreplication", default)]
    pub replication: Option<bool>,
    #[serde(rename = "rolbypassrls", default)]
    pub bypass_rls: Option<bool>,
    #[serde(rename = "rolconnlimit", default)]
    pub connection_limit: Option<i64>,
    #[serde(rename = "rolpassword", default)]
    pub password: Option<String>,
    #[serde(rename = "rolvaliduntil", default)]
    pub valid_until: Option<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            format_version: default_format_version(),
            generation: default_generation(),
            name: name.into(),
            superuser: Some(false),
            inherit: Some(true),
            create_role: Some(false),
            create_db: Some(false),
            can_login: Some(false),
            replication: Some(false),
            bypass_rls: Some(false),
            connection_limit: Some(-1),
            password: None,
            valid_until: None,
        }
    }

    pub fn login(mut self) -> Self {
        self.can_login = Some(true);
        self
    }
}

impl MetadataObject for Role {
    const KIND: MetadataKind = MetadataKind::Role;

    fn id(&self) -> Option<ObjectId> {
        self.id
    }
}
