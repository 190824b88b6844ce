//! Connection lifecycle methods on SearchApi.

use crate::db::Database;
use crate::error::{Result, SearchError};
use crate::{ConnectionInfo, SearchApi};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

impl SearchApi {
    // ========================================
    // Connection Methods
    // ========================================

    /// Swap the active database.
    ///
    /// The old connection is detached and the schema cache cleared before
    /// anything is awaited. With `Some(path)` the new database is opened and
    /// the whitelist refreshed from it; with `None` the API is left
    /// disconnected. Returns the FTS5 tables of the new database.
    pub async fn on_connection_changed(&self, new_path: Option<&Path>) -> Result<Vec<String>> {
        let (generation, old) = self.state.begin_swap();

        if let Some(old) = old {
            if let Err(e) = old.close().await {
                warn!("Failed to close {}: {}", old.path().display(), e);
            }
        }

        let Some(path) = new_path else {
            info!("Disconnected (generation {})", generation);
            return Ok(Vec::new());
        };

        let db = Arc::new(Database::open(path, generation).await?);

        if !self.state.install(&db) {
            return Err(discard_superseded(&db).await);
        }

        info!("Connected to {}", path.display());
        self.state.schema.refresh_tables(&db).await
    }

    /// Detach and close the active database, if any.
    pub async fn disconnect(&self) -> Result<()> {
        self.on_connection_changed(None).await.map(|_| ())
    }

    /// Re-read the FTS5 table list for the active connection.
    pub async fn refresh_whitelist(&self) -> Result<Vec<String>> {
        let db = self.state.current().ok_or(SearchError::NotConnected)?;
        self.state.schema.refresh_tables(&db).await
    }

    /// Whether a database is attached.
    pub fn is_connected(&self) -> bool {
        self.state.current().is_some()
    }

    /// Diagnostic snapshot of the active connection.
    pub fn connection_info(&self) -> Option<ConnectionInfo> {
        let db = self.state.current()?;
        let whitelist = self.state.schema.snapshot();
        let whitelist_size = if whitelist.generation() == db.generation() {
            whitelist.len()
        } else {
            0
        };

        Some(ConnectionInfo {
            path: db.path().to_path_buf(),
            generation: db.generation(),
            whitelist_size,
            storage_calls: db.storage_calls(),
        })
    }
}

/// Close a database whose swap was overtaken by a newer one.
async fn discard_superseded(db: &Database) -> SearchError {
    if let Err(e) = db.close().await {
        warn!("Failed to close superseded {}: {}", db.path().display(), e);
    }
    SearchError::Connection {
        path: db.path().to_path_buf(),
        message: "superseded by a newer connection".to_string(),
    }
}
