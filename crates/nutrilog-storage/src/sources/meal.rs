// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use nutrilog_core::model::MealField;
use nutrilog_core::traits::ListLookup;
use nutrilog_core::{
    DataSource, EntityKind, HealthStatus, Lookup, Meal, MealSource, NutrilogError, Record,
    RecordId, ResourceMutexManager,
};
use rusqlite::types::Value;

use super::table::SqliteTable;
use super::SourceOptions;
use crate::database::Database;

const INSERT: &str = "INSERT INTO meals (type_id, user_id, date) VALUES (?, ?, ?)";
const SELECT_BY_TYPE: &str =
    "SELECT id, type_id, user_id, date FROM meals WHERE type_id = ? ORDER BY date, id";
const SELECT_BY_USER: &str =
    "SELECT id, type_id, user_id, date FROM meals WHERE user_id = ? ORDER BY date, id";
const DELETE_BY_TYPE: &str = "DELETE FROM meals WHERE type_id = ?";

/// Meals stored in the `meals` table.
pub struct SqliteMealSource {
    name: String,
    metric: u32,
    authoritative: bool,
    table: SqliteTable,
}

impl SqliteMealSource {
    pub fn new(db: Database, locks: ResourceMutexManager, options: SourceOptions) -> Self {
        let table = EntityKind::Meal.table();
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

    async fn select(&self, sql: &str, id: RecordId) -> Result<ListLookup<Meal>, NutrilogError> {
        let rows = self
            .table
            .select_all(sql, vec![id.get().into()], from_row)
            .await?;
        Ok(Lookup::rows(rows, self.authoritative))
    }
}

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record<Meal>> {
    Ok(Record::loaded(
        RecordId(row.get("id")?),
        Meal {
            type_id: RecordId(row.get("type_id")?),
            user_id: RecordId(row.get("user_id")?),
            date: row.get("date")?,
        },
    ))
}

fn column_value(meal: &Meal, field: MealField) -> Value {
    match field {
        MealField::TypeId => meal.type_id.get().into(),
        MealField::Date => meal.date.into(),
    }
}

#[async_trait]
impl DataSource for SqliteMealSource {
    type Entity = Meal;

    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self) -> u32 {
        self.metric
    }

    async fn insert(&self, record: &mut Record<Meal>) -> Result<RecordId, NutrilogError> {
        let values: Vec<Value> = vec![
            record.type_id.get().into(),
            record.user_id.get().into(),
            record.date.into(),
        ];
        self.table.insert(record, INSERT, values).await
    }

    async fn update(&self, record: &mut Record<Meal>) -> Result<(), NutrilogError> {
        self.table.update(record, column_value).await
    }

    async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        self.table.health_check().await
    }
}

#[async_trait]
impl MealSource for SqliteMealSource {
    async fn find_all_by_type(&self, type_id: RecordId) -> Result<ListLookup<Meal>, NutrilogError> {
        self.select(SELECT_BY_TYPE, type_id).await
    }

    async fn find_all_by_user(&self, user_id: RecordId) -> Result<ListLookup<Meal>, NutrilogError> {
        self.select(SELECT_BY_USER, user_id).await
    }

    async fn delete_all_of_type(&self, type_id: RecordId) -> Result<usize, NutrilogError> {
        self.table
            .execute(DELETE_BY_TYPE, vec![type_id.get().into()])
            .await
    }
}
