// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The `Database` struct IS the single writer: query modules accept
//! `&Database` and call through `connection().call()`, which eliminates
//! SQLITE_BUSY errors under concurrent access and makes the transactional
//! check-then-insert dedup safe. Do NOT create additional Connection
//! instances for writes.

use tracing::debug;

use trunkq_core::TrunkqError;

use crate::migrations::run_migrations;

/// Handle to the single SQLite connection backing the queue store.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, TrunkqError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            run_migrations(conn).map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "queue database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database, mainly for tests.
    pub async fn open_in_memory() -> Result<Self, TrunkqError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            run_migrations(conn).map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection (single writer thread).
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<(), TrunkqError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the engine's storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> TrunkqError {
    TrunkqError::Storage {
        source: Box::new(e),
    }
}
