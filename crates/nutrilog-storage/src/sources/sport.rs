// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use nutrilog_core::model::SportField;
use nutrilog_core::traits::ListLookup;
use nutrilog_core::{
    DataSource, EntityKind, HealthStatus, Lookup, NutrilogError, Record, RecordId,
    ResourceMutexManager, Sport, SportSource,
};
use rusqlite::types::Value;

use super::table::SqliteTable;
use super::SourceOptions;
use crate::database::Database;

const INSERT: &str = "INSERT INTO sports (user_id, date, duration, intensity) VALUES (?, ?, ?, ?)";
const SELECT_BY_USER: &str = "SELECT id, user_id, date, duration, intensity \
                              FROM sports WHERE user_id = ? ORDER BY date, id";

/// Sport sessions stored in the `sports` table.
pub struct SqliteSportSource {
    name: String,
    metric: u32,
    authoritative: bool,
    table: SqliteTable,
}

impl SqliteSportSource {
    pub fn new(db: Database, locks: ResourceMutexManager, options: SourceOptions) -> Self {
        let table = EntityKind::Sport.table();
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

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record<Sport>> {
    Ok(Record::loaded(
        RecordId(row.get("id")?),
        Sport {
            user_id: RecordId(row.get("user_id")?),
            date: row.get("date")?,
            duration: row.get("duration")?,
            intensity: row.get("intensity")?,
        },
    ))
}

fn column_value(sport: &Sport, field: SportField) -> Value {
    match field {
        SportField::Date => sport.date.into(),
        SportField::Duration => sport.duration.into(),
        SportField::Intensity => sport.intensity.into(),
    }
}

#[async_trait]
impl DataSource for SqliteSportSource {
    type Entity = Sport;

    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self) -> u32 {
        self.metric
    }

    async fn insert(&self, record: &mut Record<Sport>) -> Result<RecordId, NutrilogError> {
        let values: Vec<Value> = vec![
            record.user_id.get().into(),
            record.date.into(),
            record.duration.into(),
            record.intensity.into(),
        ];
        self.table.insert(record, INSERT, values).await
    }

    async fn update(&self, record: &mut Record<Sport>) -> Result<(), NutrilogError> {
        self.table.update(record, column_value).await
    }

    async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        self.table.health_check().await
    }
}

#[async_trait]
impl SportSource for SqliteSportSource {
    async fn find_all_by_user(
        &self,
        user_id: RecordId,
    ) -> Result<ListLookup<Sport>, NutrilogError> {
        let rows = self
            .table
            .select_all(SELECT_BY_USER, vec![user_id.get().into()], from_row)
            .await?;
        Ok(Lookup::rows(rows, self.authoritative))
    }
}
