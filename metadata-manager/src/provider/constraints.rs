// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Constraint metadata provider

use super::base::{from_records, ProviderCore};
use super::tables::{insert_constraints, require_table};
use crate::dao::schema::{ID, TABLE_ID};
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId, Status};
use crate::model::{Constraint, MetadataKind, MetadataObject, ObjectId};
use serde_json::Value;

pub struct ConstraintsProvider {
    core: ProviderCore,
}

impl ConstraintsProvider {
    pub fn new(core: ProviderCore) -> Self {
        Self { core }
    }

    /// Attach a constraint to an existing table
    pub fn add_constraint(&self, constraint: &Constraint) -> (Option<ObjectId>, Status) {
        let result = self.core.transaction(|s| {
            let table_id = constraint.table_id.ok_or_else(|| {
                CatalogError::invalid_parameter("constraint without tableId")
            })?;
            require_table(s, table_id)?;
            let ids = insert_constraints(s, table_id, std::slice::from_ref(constraint))?;
            Ok((table_id, ids[0]))
        });
        let result = result.map(|(table_id, id)| {
            self.core
                .publish(Message::new(MessageId::ALTER_TABLE).arg(table_id));
            id
        });
        self.core.reply(result)
    }

    pub fn get_constraint(&self, id: ObjectId) -> (Option<Constraint>, Status) {
        let result = self.core.transaction(|s| {
            let record = s
                .dao(MetadataKind::Constraint)?
                .select_one(ID, &Value::from(id))?;
            Constraint::from_record(record)
        });
        self.core.reply(result)
    }

    /// All constraints, or those of one table
    pub fn get_constraints(&self, table_id: Option<ObjectId>) -> (Option<Vec<Constraint>>, Status) {
        let result = self.core.transaction(|s| {
            let mut dao = s.dao(MetadataKind::Constraint)?;
            let rows = match table_id {
                Some(table_id) => dao.select(TABLE_ID, &Value::from(table_id))?,
                None => dao.select_all()?,
            };
            from_records(rows)
        });
        self.core.reply(result)
    }

    pub fn remove_constraint(&self, id: ObjectId) -> (Option<ObjectId>, Status) {
        let result: CatalogResult<ObjectId> = self.core.transaction(|s| {
            let removed = s
                .dao(MetadataKind::Constraint)?
                .delete(ID, &Value::from(id))?;
            if removed == 0 {
                return Err(CatalogError::not_found(
                    MetadataKind::Constraint.node(),
                    ID,
                    id,
                ));
            }
            Ok(id)
        });
        self.core.reply(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{Column, ConstraintType, DataTypeId, Table};
    use crate::provider::base::testing::json_core;
    use crate::provider::TablesProvider;

    #[test]
    fn test_constraint_lifecycle() {
        let (core, _dir) = json_core();
        let tables = TablesProvider::new(core.clone());
        let constraints = ConstraintsProvider::new(core);

        let table_id = tables
            .add_table(&Table::new("t").with_column(Column::new("a", 1, DataTypeId::Int32.id())))
            .0
            .unwrap();

        let mut unique = Constraint::new(ConstraintType::Unique)
            .named("t_a_key")
            .on_columns(&[1]);
        unique.table_id = Some(table_id);
        let (id, status) = constraints.add_constraint(&unique);
        assert!(status.is_ok(), "{}", status);
        let id = id.unwrap();

        let fetched = constraints.get_constraint(id).0.unwrap();
        assert_eq!(fetched.name.as_deref(), Some("t_a_key"));
        assert_eq!(fetched.table_id, Some(table_id));
        assert_eq!(constraints.get_constraints(Some(table_id)).0.unwrap().len(), 1);
        assert_eq!(constraints.get_constraints(None).0.unwrap().len(), 1);

        // same name on the same table
        assert_eq!(
            constraints.add_constraint(&unique).1.code(),
            ErrorCode::AlreadyExists
        );

        assert!(constraints.remove_constraint(id).1.is_ok());
        assert_eq!(constraints.remove_constraint(id).1.code(), ErrorCode::NotFound);
        assert_eq!(constraints.get_constraint(id).1.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_constraint_requires_table() {
        let (core, _dir) = json_core();
        let constraints = ConstraintsProvider::new(core);

        let orphan = Constraint::new(ConstraintType::Check);
        assert_eq!(
            constraints.add_constraint(&orphan).1.code(),
            ErrorCode::InvalidParameter
        );

        let mut dangling = Constraint::new(ConstraintType::Check);
        dangling.table_id = Some(42);
        assert_eq!(
            constraints.add_constraint(&dangling).1.code(),
            ErrorCode::ReferenceNotFound
        );
    }
}
