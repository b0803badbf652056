// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use ringback_core::RingbackError;
use tokio_rusqlite::Connection;
use tracing::info;

/// Handle to the single SQLite connection for the process.
///
/// Opening runs embedded migrations and applies the standard PRAGMAs
/// (WAL journal mode, NORMAL synchronous, 5s busy timeout, foreign keys on).
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled.
    pub async fn open(path: &str) -> Result<Self, RingbackError> {
        Self::open_with_wal(path, true).await
    }

    /// Open (or create) the database at `path`.
    ///
    /// `wal_mode = false` keeps the default rollback journal, useful for
    /// databases on filesystems where WAL is unreliable.
    pub async fn open_with_wal(path: &str, wal_mode: bool) -> Result<Self, RingbackError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| RingbackError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path.to_string())
            .await
            .map_err(tokio_rusqlite::Error::from)
            .map_err(map_tr_err)?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;

            crate::migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        info!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection. All queries go through
    /// `connection().call(...)`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, flushing the WAL.
    pub async fn close(self) -> Result<(), RingbackError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the storage error variant.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> RingbackError {
    RingbackError::Storage {
        source: Box::new(e),
    }
}
