// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog schema installation
//!
//! Idempotent: every statement is `IF NOT EXISTS` or `ON CONFLICT DO
//! NOTHING`, so installing over an existing catalog leaves it unchanged.

use super::executor::{SqlExecutor, SqlParam};
use crate::dao::schema::{schema, ID};
use crate::dao::value::normalize_record;
use crate::error::CatalogResult;
use crate::model::{DataType, MetadataKind, MetadataObject};
use log::info;

pub const CATALOG_DDL: &str = r#"
CREATE SCHEMA IF NOT EXISTS tsurugi_catalog;

CREATE TABLE IF NOT EXISTS tsurugi_catalog.tsurugi_class (
    id bigint GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    format_version bigint NOT NULL DEFAULT 1,
    generation bigint NOT NULL DEFAULT 1,
    name text NOT NULL UNIQUE,
    namespace text,
    owner_role_id bigint,
    acl jsonb,
    number_of_tuples bigint
);

CREATE TABLE IF NOT EXISTS tsurugi_catalog.tsurugi_attribute (
    id bigint GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    format_version bigint NOT NULL DEFAULT 1,
    generation bigint NOT NULL DEFAULT 1,
    name text NOT NULL,
    table_id bigint NOT NULL,
    column_number bigint NOT NULL,
    data_type_id bigint NOT NULL,
    data_length jsonb,
    varying boolean,
    is_not_null boolean,
    default_expression text,
    UNIQUE (table_id, name),
    UNIQUE (table_id, column_number)
);

CREATE TABLE IF NOT EXISTS tsurugi_catalog.tsurugi_constraint (
    id bigint GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    format_version bigint NOT NULL DEFAULT 1,
    generation bigint NOT NULL DEFAULT 1,
    name text,
    table_id bigint NOT NULL,
    type bigint NOT NULL,
    columns jsonb,
    columns_id jsonb,
    index_id bigint,
    expression text,
    UNIQUE (table_id, name)
);

CREATE TABLE IF NOT EXISTS tsurugi_catalog.tsurugi_type (
    id bigint GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    format_version bigint NOT NULL DEFAULT 1,
    generation bigint NOT NULL DEFAULT 1,
    name text NOT NULL UNIQUE,
    pg_data_type bigint,
    pg_data_type_name text,
    pg_data_type_qualified_name text
);

CREATE TABLE IF NOT EXISTS tsurugi_catalog.tsurugi_statistic (
    id bigint GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    format_version bigint NOT NULL DEFAULT 1,
    generation bigint NOT NULL DEFAULT 1,
    name text,
    owner_kind text NOT NULL,
    owner_id bigint NOT NULL,
    table_id bigint NOT NULL,
    column_number bigint,
    statistic jsonb,
    UNIQUE (owner_kind, owner_id)
);

CREATE TABLE IF NOT EXISTS tsurugi_catalog.tsurugi_index (
    id bigint GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
    format_version bigint NOT NULL DEFAULT 1,
    generation bigint NOT NULL DEFAULT 1,
    name text NOT NULL UNIQUE,
    namespace text,
    owner_id bigint,
    acl jsonb,
    table_id bigint NOT NULL,
    access_method bigint NOT NULL DEFAULT 0,
    is_unique boolean,
    is_primary boolean,
    number_of_key_columns bigint,
    columns jsonb,
    columns_id jsonb,
    options jsonb
);
"#;

/// Advance the data type id sequence past the seeded ids
const SYNC_TYPE_SEQUENCE: &str = "SELECT pg_catalog.setval(\
    pg_catalog.pg_get_serial_sequence('tsurugi_catalog.tsurugi_type', 'id'), \
    (SELECT pg_catalog.max(id) FROM tsurugi_catalog.tsurugi_type))";

/// Create the catalog schema and seed the built-in data types
pub fn install_schema(executor: &mut dyn SqlExecutor) -> CatalogResult<()> {
    executor.batch_execute(CATALOG_DDL)?;

    let data_types = schema(MetadataKind::DataType);
    let columns: Vec<&str> = data_types.fields.iter().map(|f| f.column).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("${}", n)).collect();
    let seed_sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
        data_types.relation,
        columns.join(", "),
        placeholders.join(", ")
    );

    let mut seeded = 0;
    for builtin in DataType::builtins() {
        let mut record = normalize_record(data_types, &builtin.to_record()?)?;
        record.insert(ID.to_string(), serde_json::Value::from(builtin.id.unwrap_or_default()));
        let params = data_types
            .fields
            .iter()
            .map(|f| SqlParam::from_field(f, record.get(f.name).unwrap_or(&serde_json::Value::Null)))
            .collect::<CatalogResult<Vec<_>>>()?;
        seeded += executor.execute(&seed_sql, &params)?;
    }
    executor.batch_execute(SYNC_TYPE_SEQUENCE)?;

    info!("Catalog schema installed, {} built-in data types seeded", seeded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::postgresql::executor::fake::{Call, RecordingExecutor};

    #[test]
    fn test_install_runs_ddl_then_seeds() {
        let mut exec = RecordingExecutor::default();
        install_schema(&mut exec).unwrap();

        assert!(matches!(&exec.calls[0], Call::Batch(sql) if sql.contains("CREATE SCHEMA IF NOT EXISTS tsurugi_catalog")));
        let inserts: Vec<_> = exec
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute(sql, params) => Some((sql, params)),
                _ => None,
            })
            .collect();
        assert_eq!(inserts.len(), 6);
        assert!(inserts[0].0.ends_with("ON CONFLICT DO NOTHING"));
        assert_eq!(inserts[0].1[0], SqlParam::Int(Some(4)));
        assert_eq!(inserts[5].1[0], SqlParam::Int(Some(14)));
        assert!(matches!(exec.calls.last(), Some(Call::Batch(sql)) if sql.contains("setval")));
    }

    #[test]
    fn test_ddl_covers_every_writable_relation() {
        for kind in MetadataKind::ALL {
            let s = schema(kind);
            if s.pg_read_only {
                continue;
            }
            assert!(CATALOG_DDL.contains(&format!("TABLE IF NOT EXISTS {}", s.relation)));
            for f in s.fields {
                assert!(CATALOG_DDL.contains(&format!("    {} ", f.column)), "{}", f.column);
            }
        }
    }
}
