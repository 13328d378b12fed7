// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Per-kind field layout shared by both backends
//!
//! A [`KindSchema`] lists every field a stored object of one kind has, the
//! PostgreSQL expression that reads it, its type, and the unique keys the
//! backend enforces. The JSON and PostgreSQL DAOs are both driven by these
//! tables, which keeps their results field-for-field identical.

use crate::model::MetadataKind;

pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const TABLE_ID: &str = "tableId";
pub const COLUMN_NUMBER: &str = "columnNumber";
pub const OWNER_KIND: &str = "ownerKind";
pub const OWNER_ID: &str = "ownerId";
pub const NUMBER_OF_TUPLES: &str = "numberOfTuples";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// 64-bit signed integer (`bigint`)
    Int,
    /// UTF-8 string (`text`)
    Text,
    Bool,
    /// Arbitrary nested value (`jsonb`)
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    /// SQL expression selecting this field from the relation
    pub column: &'static str,
    pub ty: FieldType,
    pub required: bool,
    /// Value stored when the field is absent or null on write
    pub default: Option<i64>,
}

impl FieldDef {
    const fn new(name: &'static str, column: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            column,
            ty,
            required: false,
            default: None,
        }
    }

    const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    const fn defaults_to(self, value: i64) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }
}

const fn int(name: &'static str, column: &'static str) -> FieldDef {
    FieldDef::new(name, column, FieldType::Int)
}

const fn text(name: &'static str, column: &'static str) -> FieldDef {
    FieldDef::new(name, column, FieldType::Text)
}

const fn boolean(name: &'static str, column: &'static str) -> FieldDef {
    FieldDef::new(name, column, FieldType::Bool)
}

const fn json(name: &'static str, column: &'static str) -> FieldDef {
    FieldDef::new(name, column, FieldType::Json)
}

#[derive(Debug)]
pub struct KindSchema {
    pub kind: MetadataKind,
    /// JSON document array holding this kind
    pub node: &'static str,
    /// PostgreSQL relation holding this kind
    pub relation: &'static str,
    /// All fields, `id` first
    pub fields: &'static [FieldDef],
    pub unique_keys: &'static [&'static [&'static str]],
    /// The PostgreSQL relation is owned by the server and cannot be written
    pub pg_read_only: bool,
}

impl KindSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields written on insert and update
    pub fn writable_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| f.name != ID)
    }

    pub fn is_unique_key(&self, key_fields: &[&str]) -> bool {
        self.unique_keys.iter().any(|key| *key == key_fields)
    }

    pub fn id_column(&self) -> &'static str {
        self.fields[0].column
    }
}

pub const CATALOG_SCHEMA: &str = "tsurugi_catalog";

static TABLES: KindSchema = KindSchema {
    kind: MetadataKind::Table,
    node: "tables",
    relation: "tsurugi_catalog.tsurugi_class",
    fields: &[
        int(ID, "id"),
        int("formatVersion", "format_version").defaults_to(1),
        int("generation", "generation").defaults_to(1),
        text(NAME, "name").required(),
        text("namespace", "namespace"),
        int("ownerRoleId", "owner_role_id"),
        json("acl", "acl"),
        int(NUMBER_OF_TUPLES, "number_of_tuples"),
    ],
    unique_keys: &[&[NAME]],
    pg_read_only: false,
};

static COLUMNS: KindSchema = KindSchema {
    kind: MetadataKind::Column,
    node: "columns",
    relation: "tsurugi_catalog.tsurugi_attribute",
    fields: &[
        int(ID, "id"),
        int("formatVersion", "format_version").defaults_to(1),
        int("generation", "generation").defaults_to(1),
        text(NAME, "name").required(),
        int(TABLE_ID, "table_id").required(),
        int(COLUMN_NUMBER, "column_number").required(),
        int("dataTypeId", "data_type_id").required(),
        json("dataLength", "data_length"),
        boolean("varying", "varying"),
        boolean("isNotNull", "is_not_null"),
        text("defaultExpression", "default_expression"),
    ],
    unique_keys: &[&[TABLE_ID, NAME], &[TABLE_ID, COLUMN_NUMBER]],
    pg_read_only: false,
};

static CONSTRAINTS: KindSchema = KindSchema {
    kind: MetadataKind::Constraint,
    node: "constraints",
    relation: "tsurugi_catalog.tsurugi_constraint",
    fields: &[
        int(ID, "id"),
        int("formatVersion", "format_version").defaults_to(1),
        int("generation", "generation").defaults_to(1),
        text(NAME, "name"),
        int(TABLE_ID, "table_id").required(),
        int("type", "type").required(),
        json("columns", "columns"),
        json("columnsId", "columns_id"),
        int("indexId", "index_id"),
        text("expression", "expression"),
    ],
    unique_keys: &[&[TABLE_ID, NAME]],
    pg_read_only: false,
};

static DATA_TYPES: KindSchema = KindSchema {
    kind: MetadataKind::DataType,
    node: "dataTypes",
    relation: "tsurugi_catalog.tsurugi_type",
    fields: &[
        int(ID, "id"),
        int("formatVersion", "format_version").defaults_to(1),
        int("generation", "generation").defaults_to(1),
        text(NAME, "name").required(),
        int("pg_dataType", "pg_data_type"),
        text("pg_dataTypeName", "pg_data_type_name"),
        text("pg_dataTypeQualifiedName", "pg_data_type_qualified_name"),
    ],
    unique_keys: &[&[NAME]],
    pg_read_only: false,
};

static ROLES: KindSchema = KindSchema {
    kind: MetadataKind::Role,
    node: "roles",
    relation: "pg_catalog.pg_roles",
    fields: &[
        int(ID, "oid::bigint"),
        int("formatVersion", "1::bigint").defaults_to(1),
        int("generation", "1::bigint").defaults_to(1),
        text(NAME, "rolname::text").required(),
        boolean("rolsuper", "rolsuper"),
        boolean("rolinherit", "rolinherit"),
        boolean("rolcreaterole", "rolcreaterole"),
        boolean("rolcreatedb", "rolcreatedb"),
        boolean("rolcanlogin", "rolcanlogin"),
        boolean("rolreplication", "rolreplication"),
        boolean("rolbypassrls", "rolbypassrls"),
        int("rolconnlimit", "rolconnlimit::bigint"),
        text("rolpassword", "rolpassword::text"),
        text("rolvaliduntil", "rolvaliduntil::text"),
    ],
    unique_keys: &[&[NAME]],
    pg_read_only: true,
};

static STATISTICS: KindSchema = KindSchema {
    kind: MetadataKind::Statistic,
    node: "statistics",
    relation: "tsurugi_catalog.tsurugi_statistic",
    fields: &[
        int(ID, "id"),
        int("formatVersion", "format_version").defaults_to(1),
        int("generation", "generation").defaults_to(1),
        text(NAME, "name"),
        text(OWNER_KIND, "owner_kind").required(),
        int(OWNER_ID, "owner_id").required(),
        int(TABLE_ID, "table_id").required(),
        int(COLUMN_NUMBER, "column_number"),
        json("statistic", "statistic"),
    ],
    unique_keys: &[&[OWNER_KIND, OWNER_ID]],
    pg_read_only: false,
};

static INDEXES: KindSchema = KindSchema {
    kind: MetadataKind::Index,
    node: "indexes",
    relation: "tsurugi_catalog.tsurugi_index",
    fields: &[
        int(ID, "id"),
        int("formatVersion", "format_version").defaults_to(1),
        int("generation", "generation").defaults_to(1),
        text(NAME, "name").required(),
        text("namespace", "namespace"),
        int(OWNER_ID, "owner_id"),
        json("acl", "acl"),
        int(TABLE_ID, "table_id").required(),
        int("accessMethod", "access_method").defaults_to(0),
        boolean("isUnique", "is_unique"),
        boolean("isPrimary", "is_primary"),
        int("numberOfKeyColumns", "number_of_key_columns"),
        json("columns", "columns"),
        json("columnsId", "columns_id"),
        json("options", "options"),
    ],
    unique_keys: &[&[NAME]],
    pg_read_only: false,
};

/// Field layout of `kind`
pub fn schema(kind: MetadataKind) -> &'static KindSchema {
    match kind {
        MetadataKind::Table => &TABLES,
        MetadataKind::Column => &COLUMNS,
        MetadataKind::Constraint => &CONSTRAINTS,
        MetadataKind::DataType => &DATA_TYPES,
        MetadataKind::Role => &ROLES,
        MetadataKind::Statistic => &STATISTICS,
        MetadataKind::Index => &INDEXES,
    }
}
