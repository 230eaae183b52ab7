// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, migrations, and
//! error mapping.
//!
//! A [`Database`] wraps one `tokio_rusqlite::Connection`. Every call runs on
//! that connection's background thread, so `last_insert_rowid()` read after
//! an insert on the same `Database` sees that insert unless another writer
//! on the same handle got in between. The resource mutex rules that out.

use std::time::Duration;

use nutrilog_config::StorageConfig;
use nutrilog_core::{BackendError, EntityKind, HealthStatus, NutrilogError, RecordId};
use rusqlite::ErrorCode;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;
use crate::statement::Statement;

/// One SQLite connection with the Nutrilog schema applied.
pub struct Database {
    conn: Connection,
    path: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

impl Database {
    /// Open (creating if needed) the database at `config.database_path`,
    /// apply PRAGMAs, and run pending migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, NutrilogError> {
        let path = config.database_path.clone();
        if let Some(parent) = std::path::Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                BackendError::unavailable(format!("cannot create directory for `{path}`"))
                    .with_source(e)
            })?;
        }

        let conn = Connection::open(&path).await.map_err(|e| {
            BackendError::unavailable(format!("cannot open database `{path}`")).with_source(e)
        })?;

        let wal_mode = config.wal_mode;
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let applied = conn
            .call(move |conn| -> Result<usize, NutrilogError> {
                conn.busy_timeout(busy_timeout).map_err(map_sqlite_err)?;
                if wal_mode {
                    conn.pragma_update(None, "journal_mode", "WAL")
                        .map_err(map_sqlite_err)?;
                }
                conn.pragma_update(None, "synchronous", "NORMAL")
                    .map_err(map_sqlite_err)?;
                migrations::run_migrations(conn)
            })
            .await
            .map_err(map_call_err)?;

        debug!(path = %path, wal_mode, applied, "database opened");
        Ok(Self { conn, path })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Compile `sql` on the connection and return a handle to bind and run it.
    pub async fn prepare(&self, sql: &str) -> Result<Statement<'_>, NutrilogError> {
        let owned = sql.to_string();
        let param_count = self
            .conn
            .call(move |conn| -> rusqlite::Result<usize> {
                let stmt = conn.prepare_cached(&owned)?;
                Ok(stmt.parameter_count())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(Statement::new(self, sql, param_count))
    }

    /// Row id generated by the most recent successful insert on this
    /// connection.
    pub async fn last_insert_id(&self) -> Result<RecordId, NutrilogError> {
        let id = self
            .conn
            .call(|conn| -> rusqlite::Result<i64> { Ok(conn.last_insert_rowid()) })
            .await
            .map_err(map_tr_err)?;
        Ok(RecordId(id))
    }

    /// Number of rows stored for an entity kind.
    pub async fn row_count(&self, kind: EntityKind) -> Result<u64, NutrilogError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        self.conn
            .call(move |conn| conn.query_row(&sql, [], |row| row.get::<_, i64>(0)))
            .await
            .map(|count| count.max(0) as u64)
            .map_err(map_tr_err)
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        self.conn
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), NutrilogError> {
        self.conn
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!(path = %self.path, "database closed");
        Ok(())
    }
}

/// Map a rusqlite error to a backend error with a status-like code.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> NutrilogError {
    let error = match &e {
        rusqlite::Error::QueryReturnedNoRows => BackendError::not_found("no matching row"),
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::ConstraintViolation => BackendError::conflict("constraint violation"),
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen => {
                BackendError::unavailable("database unavailable")
            }
            _ => BackendError::internal("database error"),
        },
        _ => BackendError::internal("database error"),
    };
    error.with_source(e).into()
}

/// Map a tokio-rusqlite call error whose closure failed with rusqlite.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> NutrilogError {
    match e {
        tokio_rusqlite::Error::Error(inner) => map_sqlite_err(inner),
        other => connection_err(other),
    }
}

/// Map a tokio-rusqlite call error whose closure already produced a
/// [`NutrilogError`].
pub(crate) fn map_call_err(e: tokio_rusqlite::Error<NutrilogError>) -> NutrilogError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => connection_err(other),
    }
}

fn connection_err<E>(e: tokio_rusqlite::Error<E>) -> NutrilogError {
    match e {
        tokio_rusqlite::Error::ConnectionClosed => {
            BackendError::unavailable("database connection is closed").into()
        }
        tokio_rusqlite::Error::Close((_, err)) => {
            BackendError::internal("failed to close database")
                .with_source(err)
                .into()
        }
        _ => BackendError::internal("database call failed").into(),
    }
}
