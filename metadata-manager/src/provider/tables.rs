// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table metadata provider
//!
//! A table is stored as one table row plus its column and constraint rows.
//! Rows are written parent first (table, columns, constraints) and removed
//! children first (statistics, indexes, constraints, columns, table), each
//! operation in a single transaction.

use super::base::{from_records, ProviderCore};
use crate::dao::schema::{ID, NAME, OWNER_KIND, TABLE_ID};
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId, Status};
use crate::model::statistic::OWNER_COLUMN;
use crate::model::{Column, Constraint, MetadataKind, MetadataObject, ObjectId, Record, Table};
use crate::session::Session;
use log::debug;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub struct TablesProvider {
    core: ProviderCore,
}

impl TablesProvider {
    pub fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    /// Add a table with its columns and constraints; returns the table id
    pub fn add_table(&self, table: &Table) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| insert_table(s, table));
        if let Ok(id) = &result {
            self.core
                .publish(Message::new(MessageId::CREATE_TABLE).arg(id));
        }
        self.core.reply(result)
    }

    pub fn get_table(&self, id: ObjectId) -> (Option<Table>, Status) {
        let result = self
            .core
            .transaction(|s| load_table(s, ID, &Value::from(id)));
        self.core.reply(result)
    }

    pub fn get_table_by_name(&self, name: &str) -> (Option<Table>, Status) {
        let result = self
            .core
            .transaction(|s| load_table(s, NAME, &Value::from(name)));
        self.core.reply(result)
    }

    /// All tables with their columns and constraints, ordered by id
    pub fn get_tables(&self) -> (Option<Vec<Table>>, Status) {
        let result = self.core.transaction(load_all_tables);
        self.core.reply(result)
    }

    /// Replace table `id`, its column set and its constraints
    ///
    /// Column statistics of the table are dropped because the column rows
    /// are recreated. The table statistic is kept.
    pub fn update_table(&self, id: ObjectId, table: &Table) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            s.dao(MetadataKind::Table)?.update(id, &table_row(table)?)?;

            let column_stats = s
                .dao(MetadataKind::Statistic)?
                .select(TABLE_ID, &Value::from(id))?
                .into_iter()
                .filter(|r| r.get(OWNER_KIND) == Some(&Value::from(OWNER_COLUMN)))
                .filter_map(|r| r.get(ID).cloned())
                .collect::<Vec<_>>();
            for stat_id in column_stats {
                s.dao(MetadataKind::Statistic)?.delete(ID, &stat_id)?;
            }

            s.dao(MetadataKind::Constraint)?
                .delete(TABLE_ID, &Value::from(id))?;
            s.dao(MetadataKind::Column)?
                .delete(TABLE_ID, &Value::from(id))?;
            insert_columns(s, id, &table.columns)?;
            insert_constraints(s, id, &table.constraints)?;
            Ok(id)
        });
        if result.is_ok() {
            self.core
                .publish(Message::new(MessageId::ALTER_TABLE).arg(id));
        }
        self.core.reply(result)
    }

    pub fn remove_table(&self, id: ObjectId) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            let record = s.dao(MetadataKind::Table)?.select_one(ID, &Value::from(id))?;
            delete_table_rows(s, &record)
        });
        self.finish_remove(result)
    }

    pub fn remove_table_by_name(&self, name: &str) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            let record = s
                .dao(MetadataKind::Table)?
                .select_one(NAME, &Value::from(name))?;
            delete_table_rows(s, &record)
        });
        self.finish_remove(result)
    }

    fn finish_remove(&self, result: CatalogResult<ObjectId>) -> (Option<ObjectId>, Status) {
        if let Ok(id) = &result {
            self.core
                .publish(Message::new(MessageId::DROP_TABLE).arg(id));
        }
        self.core.reply(result)
    }

    /// Add columns to an existing table; returns the new column ids
    pub fn add_columns(
        &self,
        table_id: ObjectId,
        columns: &[Column],
    ) -> (Option<Vec<ObjectId>>, Status) {
        let result = self.core.transaction(|s| {
            require_table(s, table_id)?;
            insert_columns(s, table_id, columns)
        });
        if result.is_ok() {
            self.core
                .publish(Message::new(MessageId::ALTER_TABLE).arg(table_id));
        }
        self.core.reply(result)
    }

    /// Columns of table `table_id` ordered by column number
    pub fn get_columns(&self, table_id: ObjectId) -> (Option<Vec<Column>>, Status) {
        let result = self.core.transaction(|s| {
            s.dao(MetadataKind::Table)?
                .select_one(ID, &Value::from(table_id))?;
            load_columns(s, table_id)
        });
        self.core.reply(result)
    }
}

/// Table row without its child collections
fn table_row(table: &Table) -> CatalogResult<Record> {
    let mut record = table.to_record()?;
    record.remove("columns");
    record.remove("constraints");
    Ok(record)
}

/// The table row for `table_id`, or `ReferenceNotFound`
pub(crate) fn require_table(s: &mut Session, table_id: ObjectId) -> CatalogResult<Record> {
    s.dao(MetadataKind::Table)?
        .select(ID, &Value::from(table_id))?
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::reference_not_found(MetadataKind::Table.node(), table_id))
}

fn insert_table(s: &mut Session, table: &Table) -> CatalogResult<ObjectId> {
    let id = s.dao(MetadataKind::Table)?.insert(&table_row(table)?)?;
    insert_columns(s, id, &table.columns)?;
    insert_constraints(s, id, &table.constraints)?;
    debug!(
        "Added table '{}' id={} ({} columns, {} constraints)",
        table.name,
        id,
        table.columns.len(),
        table.constraints.len()
    );
    Ok(id)
}

fn insert_columns(
    s: &mut Session,
    table_id: ObjectId,
    columns: &[Column],
) -> CatalogResult<Vec<ObjectId>> {
    let mut known_types = HashSet::new();
    let mut ids = Vec::with_capacity(columns.len());
    for column in columns {
        if known_types.insert(column.data_type_id) {
            let found = s
                .dao(MetadataKind::DataType)?
                .select(ID, &Value::from(column.data_type_id))?;
            if found.is_empty() {
                return Err(CatalogError::reference_not_found(
                    MetadataKind::DataType.node(),
                    column.data_type_id,
                ));
            }
        }
        let mut record = column.to_record()?;
        record.insert(TABLE_ID.to_string(), Value::from(table_id));
        ids.push(s.dao(MetadataKind::Column)?.insert(&record)?);
    }
    Ok(ids)
}

pub(crate) fn insert_constraints(
    s: &mut Session,
    table_id: ObjectId,
    constraints: &[Constraint],
) -> CatalogResult<Vec<ObjectId>> {
    let mut ids = Vec::with_capacity(constraints.len());
    for constraint in constraints {
        let mut record = constraint.to_record()?;
        record.insert(TABLE_ID.to_string(), Value::from(table_id));
        ids.push(s.dao(MetadataKind::Constraint)?.insert(&record)?);
    }
    Ok(ids)
}

fn load_columns(s: &mut Session, table_id: ObjectId) -> CatalogResult<Vec<Column>> {
    let rows = s
        .dao(MetadataKind::Column)?
        .select(TABLE_ID, &Value::from(table_id))?;
    let mut columns: Vec<Column> = from_records(rows)?;
    columns.sort_by_key(|c| c.column_number);
    Ok(columns)
}

fn load_table(s: &mut Session, key: &str, value: &Value) -> CatalogResult<Table> {
    let record = s.dao(MetadataKind::Table)?.select_one(key, value)?;
    let mut table = Table::from_record(record)?;
    let id = table
        .id
        .ok_or_else(|| CatalogError::conversion(ID, "table row without id"))?;
    table.columns = load_columns(s, id)?;
    table.constraints = from_records(
        s.dao(MetadataKind::Constraint)?
            .select(TABLE_ID, &Value::from(id))?,
    )?;
    Ok(table)
}

fn load_all_tables(s: &mut Session) -> CatalogResult<Vec<Table>> {
    let mut tables: Vec<Table> = from_records(s.dao(MetadataKind::Table)?.select_all()?)?;

    let mut columns: HashMap<ObjectId, Vec<Column>> = HashMap::new();
    for column in from_records::<Column>(s.dao(MetadataKind::Column)?.select_all()?)? {
        if let Some(table_id) = column.table_id {
            columns.entry(table_id).or_default().push(column);
        }
    }
    let mut constraints: HashMap<ObjectId, Vec<Constraint>> = HashMap::new();
    for constraint in from_records::<Constraint>(s.dao(MetadataKind::Constraint)?.select_all()?)? {
        if let Some(table_id) = constraint.table_id {
            constraints.entry(table_id).or_default().push(constraint);
        }
    }

    for table in &mut tables {
        if let Some(id) = table.id {
            let mut cols = columns.remove(&id).unwrap_or_default();
            cols.sort_by_key(|c| c.column_number);
            table.columns = cols;
            table.constraints = constraints.remove(&id).unwrap_or_default();
        }
    }
    Ok(tables)
}

/// Remove a table and everything hanging off it; returns the table id
fn delete_table_rows(s: &mut Session, table: &Record) -> CatalogResult<ObjectId> {
    let id_value = table.get(ID).cloned().unwrap_or(Value::Null);
    let id = id_value
        .as_i64()
        .ok_or_else(|| CatalogError::conversion(ID, "table row without id"))?;

    let statistics = s.dao(MetadataKind::Statistic)?.delete(TABLE_ID, &id_value)?;
    let indexes = s.dao(MetadataKind::Index)?.delete(TABLE_ID, &id_value)?;
    let constraints = s.dao(MetadataKind::Constraint)?.delete(TABLE_ID, &id_value)?;
    let columns = s.dao(MetadataKind::Column)?.delete(TABLE_ID, &id_value)?;
    s.dao(MetadataKind::Table)?.delete(ID, &id_value)?;
    debug!(
        "Removed table id={} ({} columns, {} constraints, {} indexes, {} statistics)",
        id, columns, constraints, indexes, statistics
    );
    Ok(id)
}
