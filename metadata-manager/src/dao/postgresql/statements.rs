// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! SQL statement construction from a [`KindSchema`]
//!
//! Identifiers come from the static schema tables; values are always bound
//! through `$n` placeholders.

use crate::dao::schema::{FieldDef, KindSchema, ID};

fn select_list(schema: &KindSchema) -> String {
    schema
        .fields
        .iter()
        .map(|f| format!("{} AS \"{}\"", f.column, f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn writable_columns(schema: &KindSchema) -> Vec<&'static str> {
    schema.writable_fields().map(|f| f.column).collect()
}

fn placeholders(from: usize, count: usize) -> String {
    (from..from + count)
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn select(schema: &KindSchema, filter: Option<&FieldDef>) -> String {
    let mut sql = format!("SELECT {} FROM {}", select_list(schema), schema.relation);
    if let Some(field) = filter {
        sql.push_str(&format!(" WHERE {} = $1", field.column));
    }
    sql.push_str(&format!(" ORDER BY \"{}\"", ID));
    sql
}

pub fn insert(schema: &KindSchema) -> String {
    let columns = writable_columns(schema);
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {} AS \"{}\"",
        schema.relation,
        columns.join(", "),
        placeholders(1, columns.len()),
        schema.id_column(),
        ID
    )
}

/// Update every writable column; the id is bound last
pub fn update(schema: &KindSchema) -> String {
    let columns = writable_columns(schema);
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", c, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        schema.relation,
        assignments,
        schema.id_column(),
        columns.len() + 1
    )
}

/// Insert-or-replace on the unique constraint over `key_fields`
pub fn upsert(schema: &KindSchema, key_fields: &[&str]) -> String {
    let columns = writable_columns(schema);
    let key_columns: Vec<&str> = key_fields
        .iter()
        .filter_map(|k| schema.field(k).map(|f| f.column))
        .collect();
    let assignments = columns
        .iter()
        .filter(|c| !key_columns.contains(c))
        .map(|c| format!("{} = EXCLUDED.{}", c, c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING {} AS \"{}\"",
        schema.relation,
        columns.join(", "),
        placeholders(1, columns.len()),
        key_columns.join(", "),
        assignments,
        schema.id_column(),
        ID
    )
}

pub fn delete(schema: &KindSchema, filter: &FieldDef) -> String {
    format!("DELETE FROM {} WHERE {} = $1", schema.relation, filter.column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::schema::schema;
    use crate::model::MetadataKind;

    #[test]
    fn test_select_statement() {
        let s = schema(MetadataKind::DataType);
        let sql = select(s, s.field("name"));
        assert!(sql.starts_with("SELECT id AS \"id\", format_version AS \"formatVersion\""));
        assert!(sql.contains("pg_data_type_name AS \"pg_dataTypeName\""));
        assert!(sql.contains("FROM tsurugi_catalog.tsurugi_type WHERE name = $1"));
        assert!(sql.ends_with("ORDER BY \"id\""));

        let all = select(s, None);
        assert!(!all.contains("WHERE"));
    }

    #[test]
    fn test_roles_select_reads_pg_roles() {
        let s = schema(MetadataKind::Role);
        let sql = select(s, s.field("name"));
        assert!(sql.contains("oid::bigint AS \"id\""));
        assert!(sql.contains("FROM pg_catalog.pg_roles WHERE rolname::text = $1"));
    }

    #[test]
    fn test_insert_statement() {
        let sql = insert(schema(MetadataKind::Table));
        assert_eq!(
            sql,
            "INSERT INTO tsurugi_catalog.tsurugi_class \
             (format_version, generation, name, namespace, owner_role_id, acl, number_of_tuples) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id AS \"id\""
        );
    }

    #[test]
    fn test_update_statement_binds_id_last() {
        let sql = update(schema(MetadataKind::DataType));
        assert!(sql.starts_with("UPDATE tsurugi_catalog.tsurugi_type SET format_version = $1,"));
        assert!(sql.ends_with("pg_data_type_qualified_name = $6 WHERE id = $7"));
    }

    #[test]
    fn test_upsert_statement() {
        let sql = upsert(schema(MetadataKind::Statistic), &["ownerKind", "ownerId"]);
        assert!(sql.contains("ON CONFLICT (owner_kind, owner_id) DO UPDATE SET"));
        assert!(sql.contains("statistic = EXCLUDED.statistic"));
        assert!(!sql.contains("owner_id = EXCLUDED.owner_id"));
        assert!(sql.ends_with("RETURNING id AS \"id\""));
    }

    #[test]
    fn test_delete_statement() {
        let s = schema(MetadataKind::Column);
        assert_eq!(
            delete(s, s.field("tableId").unwrap()),
            "DELETE FROM tsurugi_catalog.tsurugi_attribute WHERE table_id = $1"
        );
    }
}
