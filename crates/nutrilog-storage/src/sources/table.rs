// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statement plumbing shared by the SQLite data sources.

use nutrilog_core::{
    BackendError, Entity, Field, HealthStatus, NutrilogError, Record, RecordId,
    ResourceMutexManager,
};
use rusqlite::types::Value;
use tracing::{debug, error};

use crate::database::Database;
use crate::statement::Statement;

type RowMapper<T> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>;

/// One table on one connection, plus the lock manager guarding its inserts.
pub(crate) struct SqliteTable {
    db: Database,
    locks: ResourceMutexManager,
    table: &'static str,
}

impl SqliteTable {
    pub(crate) fn new(db: Database, locks: ResourceMutexManager, table: &'static str) -> Self {
        Self { db, locks, table }
    }

    pub(crate) fn database(&self) -> &Database {
        &self.db
    }

    /// Insert a row and read back its id while holding the table lock.
    ///
    /// The guard is dropped on every early return, so a failed insert never
    /// leaves the table locked. Once the row is written, a failed id read is
    /// not retryable: another source must not receive the same record.
    pub(crate) async fn insert<E: Entity>(
        &self,
        record: &mut Record<E>,
        sql: &str,
        values: Vec<Value>,
    ) -> Result<RecordId, NutrilogError> {
        record.ensure_new()?;
        let guard = self.locks.acquire(self.table).await?;

        self.execute(sql, values).await?;
        let id = self
            .db
            .last_insert_id()
            .await
            .map_err(|err| identity_lost(self.table, err))?;
        record.assign_id(id)?;
        record.clear_changed_fields();

        guard.release()?;
        debug!(table = self.table, %id, "row inserted");
        Ok(id)
    }

    /// Write only the changed columns of a persisted record.
    pub(crate) async fn update<E: Entity>(
        &self,
        record: &mut Record<E>,
        value_of: fn(&E, E::Field) -> Value,
    ) -> Result<(), NutrilogError> {
        let id = record.persisted_id()?;
        let changed = record.changed_fields();
        if changed.is_empty() {
            debug!(table = self.table, %id, "update skipped, nothing changed");
            return Ok(());
        }

        let assignments: Vec<String> = changed
            .iter()
            .map(|field| format!("{} = ?", field.column()))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            self.table,
            assignments.join(", ")
        );
        let mut values: Vec<Value> = changed
            .iter()
            .map(|field| value_of(record.entity(), field))
            .collect();
        values.push(Value::Integer(id.get()));

        if self.execute(&sql, values).await? == 0 {
            return Err(BackendError::not_found(format!("{} row {id} does not exist", self.table)).into());
        }
        record.clear_changed_fields();
        debug!(table = self.table, %id, "row updated");
        Ok(())
    }

    /// Run a statement and return the number of changed rows.
    pub(crate) async fn execute(&self, sql: &str, values: Vec<Value>) -> Result<usize, NutrilogError> {
        let stmt = self.bound(sql, values).await?;
        let outcome = stmt.run().await;
        stmt.finalize();
        outcome
    }

    pub(crate) async fn select_all<T: Send + 'static>(
        &self,
        sql: &str,
        values: Vec<Value>,
        map: RowMapper<T>,
    ) -> Result<Vec<T>, NutrilogError> {
        let stmt = self.bound(sql, values).await?;
        let outcome = stmt.all(map).await;
        stmt.finalize();
        outcome
    }

    pub(crate) async fn select_one<T: Send + 'static>(
        &self,
        sql: &str,
        values: Vec<Value>,
        map: RowMapper<T>,
    ) -> Result<Option<T>, NutrilogError> {
        let stmt = self.bound(sql, values).await?;
        let outcome = stmt.get(map).await;
        stmt.finalize();
        outcome
    }

    /// Prepare `sql` and bind `values`, finalizing the handle if binding fails.
    async fn bound(&self, sql: &str, values: Vec<Value>) -> Result<Statement<'_>, NutrilogError> {
        let mut stmt = self.db.prepare(sql).await?;
        let bound = stmt.bind(values).map(|_| ());
        if let Err(err) = bound {
            stmt.finalize();
            return Err(err.into());
        }
        Ok(stmt)
    }

    pub(crate) async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        self.db.health_check().await
    }
}

fn identity_lost(table: &str, err: NutrilogError) -> NutrilogError {
    error!(table, error = %err, "row written but its id could not be read back");
    NutrilogError::Internal(format!(
        "row written to {table} but its id could not be read back: {err}"
    ))
}
