// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Statistics provider
//!
//! A statistic belongs to a table or to one of its columns and is keyed by
//! `(ownerKind, ownerId)`. Setting a statistic is an upsert, so repeating
//! it replaces the previous payload. Column statistics are addressed by
//! table id and column number.

use super::base::{from_records, ProviderCore};
use super::tables::require_table;
use crate::dao::schema::{COLUMN_NUMBER, ID, NUMBER_OF_TUPLES, OWNER_ID, OWNER_KIND, TABLE_ID};
use crate::error::{CatalogError, CatalogResult};
use crate::message::Status;
use crate::model::statistic::{OWNER_COLUMN, OWNER_TABLE};
use crate::model::{MetadataKind, MetadataObject, ObjectId, Statistic};
use crate::session::Session;
use log::debug;
use serde_json::Value;

const OWNER_KEY: &[&str] = &[OWNER_KIND, OWNER_ID];

pub struct StatisticsProvider {
    core: ProviderCore,
}

impl StatisticsProvider {
    pub fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    /// Set the statistic of table `table_id`; returns the statistic id
    ///
    /// A numeric `numberOfTuples` in the payload is copied to the table row.
    pub fn set_table_statistic(
        &self,
        table_id: ObjectId,
        statistic: Value,
    ) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            let mut table = require_table(s, table_id)?;
            let stat = Statistic::for_table(table_id, statistic);
            let id = s
                .dao(MetadataKind::Statistic)?
                .upsert(OWNER_KEY, &stat.to_record()?)?;

            if let Some(tuples) = stat.number_of_tuples() {
                table.insert(NUMBER_OF_TUPLES.to_string(), Value::from(tuples));
                s.dao(MetadataKind::Table)?.update(table_id, &table)?;
                debug!("Table id={} now has {} tuples", table_id, tuples);
            }
            Ok(id)
        });
        self.core.reply(result)
    }

    /// Set the statistic of column `column_number` of table `table_id`
    pub fn set_column_statistic(
        &self,
        table_id: ObjectId,
        column_number: i64,
        statistic: Value,
    ) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            require_table(s, table_id)?;
            let column_id = resolve_column(s, table_id, column_number)?;
            let stat = Statistic::for_column(table_id, column_id, column_number, statistic);
            s.dao(MetadataKind::Statistic)?
                .upsert(OWNER_KEY, &stat.to_record()?)
        });
        self.core.reply(result)
    }

    pub fn get_table_statistic(&self, table_id: ObjectId) -> (Option<Statistic>, Status) {
        let result = self.core.transaction(|s| {
            table_statistics(s, table_id)?
                .into_iter()
                .find(|st| st.owner_kind == OWNER_TABLE)
                .ok_or_else(|| {
                    CatalogError::not_found(MetadataKind::Statistic.node(), TABLE_ID, table_id)
                })
        });
        self.core.reply(result)
    }

    pub fn get_column_statistic(
        &self,
        table_id: ObjectId,
        column_number: i64,
    ) -> (Option<Statistic>, Status) {
        let result = self
            .core
            .transaction(|s| find_column_statistic(s, table_id, column_number));
        self.core.reply(result)
    }

    /// Column statistics of one table, ordered by column number
    pub fn get_column_statistics(&self, table_id: ObjectId) -> (Option<Vec<Statistic>>, Status) {
        let result = self.core.transaction(|s| {
            let mut stats: Vec<Statistic> = table_statistics(s, table_id)?
                .into_iter()
                .filter(|st| st.owner_kind == OWNER_COLUMN)
                .collect();
            stats.sort_by_key(|st| st.column_number);
            Ok(stats)
        });
        self.core.reply(result)
    }

    pub fn get_statistics(&self) -> (Option<Vec<Statistic>>, Status) {
        let result = self
            .core
            .transaction(|s| from_records(s.dao(MetadataKind::Statistic)?.select_all()?));
        self.core.reply(result)
    }

    /// Remove one column statistic; returns the removed statistic id
    pub fn remove_column_statistic(
        &self,
        table_id: ObjectId,
        column_number: i64,
    ) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            let stat = find_column_statistic(s, table_id, column_number)?;
            let id = stat
                .id
                .ok_or_else(|| CatalogError::conversion(ID, "statistic row without id"))?;
            s.dao(MetadataKind::Statistic)?.delete(ID, &Value::from(id))?;
            Ok(id)
        });
        self.core.reply(result)
    }

    /// Remove every statistic of table `table_id`; returns the count removed
    pub fn remove_statistics(&self, table_id: ObjectId) -> (Option<u64>, Status) {
        let result = self.core.transaction(|s| {
            s.dao(MetadataKind::Statistic)?
                .delete(TABLE_ID, &Value::from(table_id))
        });
        self.core.reply(result)
    }
}

fn table_statistics(s: &mut Session, table_id: ObjectId) -> CatalogResult<Vec<Statistic>> {
    from_records(
        s.dao(MetadataKind::Statistic)?
            .select(TABLE_ID, &Value::from(table_id))?,
    )
}

fn find_column_statistic(
    s: &mut Session,
    table_id: ObjectId,
    column_number: i64,
) -> CatalogResult<Statistic> {
    table_statistics(s, table_id)?
        .into_iter()
        .find(|st| st.owner_kind == OWNER_COLUMN && st.column_number == Some(column_number))
        .ok_or_else(|| {
            CatalogError::not_found(
                MetadataKind::Statistic.node(),
                COLUMN_NUMBER,
                format!("{} (table id={})", column_number, table_id),
            )
        })
}

/// Id of column `column_number` of table `table_id`
fn resolve_column(s: &mut Session, table_id: ObjectId, column_number: i64) -> CatalogResult<ObjectId> {
    s.dao(MetadataKind::Column)?
        .select(TABLE_ID, &Value::from(table_id))?
        .iter()
        .find(|c| c.get(COLUMN_NUMBER).and_then(Value::as_i64) == Some(column_number))
        .and_then(|c| c.get(ID).and_then(Value::as_i64))
        .ok_or_else(|| {
            CatalogError::reference_not_found(
                MetadataKind::Column.node(),
                format!("{}#{}", table_id, column_number),
            )
        })
}
