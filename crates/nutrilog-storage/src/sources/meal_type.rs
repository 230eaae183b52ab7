// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use nutrilog_core::model::MealTypeField;
use nutrilog_core::traits::{ListLookup, SingleLookup};
use nutrilog_core::{
    DataSource, EntityKind, HealthStatus, Lookup, MealType, MealTypeSource, NutrilogError, Record,
    RecordId, ResourceMutexManager,
};
use rusqlite::types::Value;

use super::table::SqliteTable;
use super::SourceOptions;
use crate::database::Database;

const INSERT: &str = "INSERT INTO meal_types (user_id, name, calories, carbs, proteins, fat) \
                      VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT id, user_id, name, calories, carbs, proteins, fat \
                            FROM meal_types WHERE id = ?";
const SELECT_BY_USER: &str = "SELECT id, user_id, name, calories, carbs, proteins, fat \
                              FROM meal_types WHERE user_id = ? ORDER BY id";
const DELETE: &str = "DELETE FROM meal_types WHERE id = ?";

/// Meal types stored in the `meal_types` table.
pub struct SqliteMealTypeSource {
    name: String,
    metric: u32,
    authoritative: bool,
    table: SqliteTable,
}

impl SqliteMealTypeSource {
    pub fn new(db: Database, locks: ResourceMutexManager, options: SourceOptions) -> Self {
        let table = EntityKind::MealType.table();
        Self {
            name: options.resolve_name(table),
            metric: options.metric,
            authoritative: options.authoritative,
            table: SqliteTable::new(db, locks, table),
        }
    }

    pub fn database(&self) -> &Database {
        self.table.database()
    }
}

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record<MealType>> {
    Ok(Record::loaded(
        RecordId(row.get("id")?),
        MealType {
            user_id: RecordId(row.get("user_id")?),
            name: row.get("name")?,
            calories: row.get("calories")?,
            carbs: row.get("carbs")?,
            proteins: row.get("proteins")?,
            fat: row.get("fat")?,
        },
    ))
}

fn column_value(meal_type: &MealType, field: MealTypeField) -> Value {
    match field {
        MealTypeField::Name => meal_type.name.clone().into(),
        MealTypeField::Calories => meal_type.calories.into(),
        MealTypeField::Carbs => meal_type.carbs.into(),
        MealTypeField::Proteins => meal_type.proteins.into(),
        MealTypeField::Fat => meal_type.fat.into(),
    }
}

#[async_trait]
impl DataSource for SqliteMealTypeSource {
    type Entity = MealType;

    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self) -> u32 {
        self.metric
    }

    async fn insert(&self, record: &mut Record<MealType>) -> Result<RecordId, NutrilogError> {
        let values: Vec<Value> = vec![
            record.user_id.get().into(),
            record.name.clone().into(),
            record.calories.into(),
            record.carbs.into(),
            record.proteins.into(),
            record.fat.into(),
        ];
        self.table.insert(record, INSERT, values).await
    }

    async fn update(&self, record: &mut Record<MealType>) -> Result<(), NutrilogError> {
        self.table.update(record, column_value).await
    }

    async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        self.table.health_check().await
    }
}

#[async_trait]
impl MealTypeSource for SqliteMealTypeSource {
    async fn find_by_id(&self, id: RecordId) -> Result<SingleLookup<MealType>, NutrilogError> {
        let row = self
            .table
            .select_one(SELECT_BY_ID, vec![id.get().into()], from_row)
            .await?;
        Ok(Lookup::row(row, self.authoritative))
    }

    async fn find_all_by_user(
        &self,
        user_id: RecordId,
    ) -> Result<ListLookup<MealType>, NutrilogError> {
        let rows = self
            .table
            .select_all(SELECT_BY_USER, vec![user_id.get().into()], from_row)
            .await?;
        Ok(Lookup::rows(rows, self.authoritative))
    }

    async fn delete(&self, id: RecordId) -> Result<(), NutrilogError> {
        self.table.execute(DELETE, vec![id.get().into()]).await?;
        Ok(())
    }
}
