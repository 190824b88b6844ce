//! Handle to the single active SQLite connection.

use crate::config::DatabaseConfig;
use crate::{Result, SearchError};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// An open database file.
///
/// Storage work runs on the blocking pool so the async callers never stall the
/// event loop. The connection sits behind `Arc<Mutex<Option<_>>>`: closing takes
/// it out, and any call that queues up behind the close sees `NotConnected`.
pub struct Database {
    path: PathBuf,
    generation: u64,
    conn: Arc<Mutex<Option<Connection>>>,
    storage_calls: Arc<AtomicU64>,
}

impl Database {
    /// Open and validate a database file.
    ///
    /// The file must already exist; nothing is created. A file that SQLite
    /// cannot read as a database fails with `SearchError::Connection`.
    pub async fn open(path: impl Into<PathBuf>, generation: u64) -> Result<Self> {
        let path = path.into();

        if !path.is_file() {
            return Err(SearchError::Connection {
                path,
                message: "no such database file".to_string(),
            });
        }

        let open_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || Self::open_blocking(&open_path))
            .await
            .map_err(|e| SearchError::Other(format!("Database open task failed: {}", e)))??;

        info!("Opened database {} (generation {})", path.display(), generation);

        Ok(Self {
            path,
            generation,
            conn: Arc::new(Mutex::new(Some(conn))),
            storage_calls: Arc::new(AtomicU64::new(0)),
        })
    }

    fn open_blocking(path: &Path) -> Result<Connection> {
        let connection_error = |e: rusqlite::Error| SearchError::Connection {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(connection_error)?;

        conn.busy_timeout(DatabaseConfig::BUSY_TIMEOUT)
            .map_err(connection_error)?;

        // SQLite opens lazily; the first read is what rejects non-database files.
        conn.query_row(DatabaseConfig::VALIDATION_PROBE, [], |row| row.get::<_, i64>(0))
            .map_err(connection_error)?;

        Ok(conn)
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connection generation this handle was opened under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of storage calls issued through this handle.
    pub fn storage_calls(&self) -> u64 {
        self.storage_calls.load(Ordering::Relaxed)
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        self.storage_calls.fetch_add(1, Ordering::Relaxed);

        tokio::task::spawn_blocking(move || {
            let guard = lock_conn(&conn)?;
            match guard.as_ref() {
                Some(conn) => f(conn),
                None => Err(SearchError::NotConnected),
            }
        })
        .await
        .map_err(|e| SearchError::Other(format!("Storage task failed: {}", e)))?
    }

    /// Run `f` inside a transaction; commits on `Ok`, rolls back on `Err`.
    pub async fn call_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        self.storage_calls.fetch_add(1, Ordering::Relaxed);

        tokio::task::spawn_blocking(move || {
            let mut guard = lock_conn(&conn)?;
            let conn = guard.as_mut().ok_or(SearchError::NotConnected)?;
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await
        .map_err(|e| SearchError::Other(format!("Storage task failed: {}", e)))?
    }

    /// Close the connection. Later calls on this handle fail with `NotConnected`.
    pub async fn close(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let taken = lock_conn(&conn)?.take();
            match taken {
                Some(c) => c.close().map_err(|(_, e)| SearchError::from(e)),
                None => Ok(()),
            }
        })
        .await
        .map_err(|e| SearchError::Other(format!("Database close task failed: {}", e)))??;

        debug!("Closed database {}", path.display());
        Ok(())
    }
}

fn lock_conn(
    conn: &Mutex<Option<Connection>>,
) -> Result<MutexGuard<'_, Option<Connection>>> {
    conn.lock()
        .map_err(|_| SearchError::Other("Connection lock poisoned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db() -> (PathBuf, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute("CREATE TABLE notes (body TEXT)", []).unwrap();
        (db_path, temp_dir)
    }

    #[tokio::test]
    async fn test_open_and_call() {
        let (path, _temp) = create_test_db();
        let db = Database::open(&path, 1).await.unwrap();

        let count: i64 = db
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(db.storage_calls(), 1);
        assert_eq!(db.generation(), 1);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Database::open(temp_dir.path().join("missing.db"), 1).await;
        assert!(matches!(result, Err(SearchError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_open_rejects_non_database() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "this is definitely not a sqlite file, just plain text").unwrap();

        let result = Database::open(&path, 1).await;
        assert!(matches!(result, Err(SearchError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_call_after_close() {
        let (path, _temp) = create_test_db();
        let db = Database::open(&path, 1).await.unwrap();
        db.close().await.unwrap();

        let result = db.call(|_| Ok(())).await;
        assert!(matches!(result, Err(SearchError::NotConnected)));
    }

    #[tokio::test]
    async fn test_call_mut_rolls_back_on_error() {
        let (path, _temp) = create_test_db();
        let db = Database::open(&path, 1).await.unwrap();

        let result: Result<()> = db
            .call_mut(|tx| {
                tx.execute("INSERT INTO notes VALUES ('kept?')", [])?;
                Err(SearchError::Other("abort".into()))
            })
            .await;
        assert!(result.is_err());

        let count: i64 = db
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
