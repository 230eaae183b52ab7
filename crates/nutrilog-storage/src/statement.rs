// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prepared statement handle: bind, execute, read, finalize.
//!
//! The compiled statement lives in the connection's statement cache; the
//! handle carries the SQL, its parameter count, and the bound values.
//! Finalizing consumes the handle, so it cannot be used afterwards. A handle
//! dropped without `finalize` is finalized anyway and logged.

use nutrilog_core::{BackendError, NutrilogError};
use rusqlite::OptionalExtension;
use rusqlite::types::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::{map_tr_err, Database};

/// Misuse of a statement handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    #[error("statement expects {expected} parameters, {given} were bound")]
    ParameterCount { expected: usize, given: usize },

    #[error("statement has {expected} parameters but none were bound")]
    Unbound { expected: usize },
}

impl From<StatementError> for NutrilogError {
    fn from(e: StatementError) -> Self {
        BackendError::internal("statement misuse").with_source(e).into()
    }
}

/// One prepared, parameterized SQL command on a [`Database`].
pub struct Statement<'db> {
    db: &'db Database,
    sql: String,
    param_count: usize,
    params: Option<Vec<Value>>,
    finalized: bool,
}

impl<'db> Statement<'db> {
    pub(crate) fn new(db: &'db Database, sql: &str, param_count: usize) -> Self {
        Self {
            db,
            sql: sql.to_string(),
            param_count,
            params: None,
            finalized: false,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of `?` placeholders in the SQL.
    pub fn parameter_count(&self) -> usize {
        self.param_count
    }

    /// Bind positional values, replacing any earlier binding.
    pub fn bind<I>(&mut self, params: I) -> Result<&mut Self, StatementError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let params: Vec<Value> = params.into_iter().map(Into::into).collect();
        if params.len() != self.param_count {
            return Err(StatementError::ParameterCount {
                expected: self.param_count,
                given: params.len(),
            });
        }
        self.params = Some(params);
        Ok(self)
    }

    /// Execute and return the number of rows changed.
    pub async fn run(&self) -> Result<usize, NutrilogError> {
        let (sql, params) = self.execution()?;
        self.db
            .connection()
            .call(move |conn| -> rusqlite::Result<usize> {
                let mut stmt = conn.prepare_cached(&sql)?;
                stmt.execute(rusqlite::params_from_iter(params))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Execute and map every result row.
    pub async fn all<T, F>(&self, map: F) -> Result<Vec<T>, NutrilogError>
    where
        T: Send + 'static,
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let (sql, params) = self.execution()?;
        self.db
            .connection()
            .call(move |conn| -> rusqlite::Result<Vec<T>> {
                let mut stmt = conn.prepare_cached(&sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(params), map)?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Execute and map the first row, if any.
    pub async fn get<T, F>(&self, map: F) -> Result<Option<T>, NutrilogError>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        let (sql, params) = self.execution()?;
        self.db
            .connection()
            .call(move |conn| -> rusqlite::Result<Option<T>> {
                let mut stmt = conn.prepare_cached(&sql)?;
                stmt.query_row(rusqlite::params_from_iter(params), map)
                    .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Release the handle.
    pub fn finalize(mut self) {
        self.finalized = true;
        debug!(sql = %self.sql, "statement finalized");
    }

    fn execution(&self) -> Result<(String, Vec<Value>), StatementError> {
        match &self.params {
            Some(params) => Ok((self.sql.clone(), params.clone())),
            None if self.param_count == 0 => Ok((self.sql.clone(), Vec::new())),
            None => Err(StatementError::Unbound {
                expected: self.param_count,
            }),
        }
    }
}

impl std::fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql)
            .field("param_count", &self.param_count)
            .field("bound", &self.params.is_some())
            .finish()
    }
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        if !self.finalized {
            warn!(sql = %self.sql, "statement dropped without finalize");
        }
    }
}
