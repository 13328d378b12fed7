// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table privileges
//!
//! Privileges use PostgreSQL's aclitem letters. A table's `acl` holds
//! items of the form `grantee=privileges/grantor`; an empty grantee grants
//! to every role.

use super::ObjectId;
use crate::error::{CatalogError, CatalogResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A permission string: optional `grantee=`, privilege letters, optional
/// `/grantor`
static PERMISSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:.*=)?([rawdDxt]+)(?:/.*)?$").unwrap());

static ACL_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^=]*)=([A-Za-z*]*)(?:/(.*))?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Privilege {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    References,
    Trigger,
}

impl Privilege {
    pub const ALL: [Privilege; 7] = [
        Privilege::Select,
        Privilege::Insert,
        Privilege::Update,
        Privilege::Delete,
        Privilege::Truncate,
        Privilege::References,
        Privilege::Trigger,
    ];

    pub fn acl_char(self) -> char {
        match self {
            Privilege::Select => 'r',
            Privilege::Insert => 'a',
            Privilege::Update => 'w',
            Privilege::Delete => 'd',
            Privilege::Truncate => 'D',
            Privilege::References => 'x',
            Privilege::Trigger => 't',
        }
    }

    pub fn from_acl_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.acl_char() == c)
    }
}

/// Parse a permission string such as `rw` or `alice=arwd/postgres`
pub fn parse_permission(permission: &str) -> CatalogResult<Vec<Privilege>> {
    let caps = PERMISSION.captures(permission).ok_or_else(|| {
        CatalogError::invalid_parameter(format!("invalid permission '{}'", permission))
    })?;
    Ok(caps[1].chars().filter_map(Privilege::from_acl_char).collect())
}

/// One parsed `grantee=privileges/grantor` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclItem {
    /// Empty for PUBLIC
    pub grantee: String,
    pub privileges: Vec<Privilege>,
    pub grantor: Option<String>,
}

impl AclItem {
    /// Parse one item; letters outside the table privilege set (grant
    /// option markers and the like) are skipped
    pub fn parse(item: &str) -> Option<Self> {
        let caps = ACL_ITEM.captures(item)?;
        Some(Self {
            grantee: caps[1].to_string(),
            privileges: caps[2].chars().filter_map(Privilege::from_acl_char).collect(),
            grantor: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    /// Whether this item applies to the role named `role`
    pub fn applies_to(&self, role: &str) -> bool {
        self.grantee.is_empty() || self.grantee == role
    }
}

/// Items of a table `acl` value; anything that is not a string item is
/// ignored
pub fn acl_items(acl: Option<&Value>) -> Vec<AclItem> {
    acl.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(AclItem::parse)
                .collect()
        })
        .unwrap_or_default()
}

/// What one role may do with one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePrivileges {
    pub table_id: ObjectId,
    pub table_name: String,
    pub select: bool,
    pub insert: bool,
    pub update: bool,
    pub delete: bool,
    pub truncate: bool,
    pub references: bool,
    pub trigger: bool,
}

impl TablePrivileges {
    pub fn none(table_id: ObjectId, table_name: impl Into<String>) -> Self {
        Self {
            table_id,
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    pub fn grant(&mut self, privilege: Privilege) {
        *self.flag_mut(privilege) = true;
    }

    pub fn grant_all(&mut self) {
        for p in Privilege::ALL {
            self.grant(p);
        }
    }

    pub fn has(&self, privilege: Privilege) -> bool {
        match privilege {
            Privilege::Select => self.select,
            Privilege::Insert => self.insert,
            Privilege::Update => self.update,
            Privilege::Delete => self.delete,
            Privilege::Truncate => self.truncate,
            Privilege::References => self.references,
            Privilege::Trigger => self.trigger,
        }
    }

    pub fn has_all(&self, privileges: &[Privilege]) -> bool {
        privileges.iter().all(|p| self.has(*p))
    }

    /// Privileges held, as aclitem letters
    pub fn acl_string(&self) -> String {
        Privilege::ALL
            .into_iter()
            .filter(|p| self.has(*p))
            .map(Privilege::acl_char)
            .collect()
    }

    fn flag_mut(&mut self, privilege: Privilege) -> &mut bool {
        match privilege {
            Privilege::Select => &mut self.select,
            Privilege::Insert => &mut self.insert,
            Privilege::Update => &mut self.update,
            Privilege::Delete => &mut self.delete,
            Privilege::Truncate => &mut self.truncate,
            Privilege::References => &mut self.references,
            Privilege::Trigger => &mut self.trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_parse_permission() {
        assert_eq!(
            parse_permission("rw").unwrap(),
            vec![Privilege::Select, Privilege::Update]
        );
        assert_eq!(
            parse_permission("alice=aD/postgres").unwrap(),
            vec![Privilege::Insert, Privilege::Truncate]
        );
        for bad in ["", "rwz", "alice=", "U"] {
            assert_eq!(
                parse_permission(bad).unwrap_err().code(),
                ErrorCode::InvalidParameter,
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_acl_items() {
        let acl = json!(["alice=r*w/postgres", "=x/postgres", 7, "garbage"]);
        let items = acl_items(Some(&acl));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].privileges, vec![Privilege::Select, Privilege::Update]);
        assert_eq!(items[0].grantor.as_deref(), Some("postgres"));
        assert!(items[0].applies_to("alice"));
        assert!(!items[0].applies_to("bob"));
        assert!(items[1].applies_to("bob"));
        assert!(acl_items(None).is_empty());
    }

    #[test]
    fn test_table_privileges() {
        let mut p = TablePrivileges::none(1, "t");
        p.grant(Privilege::Select);
        p.grant(Privilege::Trigger);
        assert!(p.has_all(&[Privilege::Select]));
        assert!(!p.has_all(&[Privilege::Select, Privilege::Insert]));
        assert_eq!(p.acl_string(), "rt");
        p.grant_all();
        assert_eq!(p.acl_string(), "rawdDxt");
    }
}
