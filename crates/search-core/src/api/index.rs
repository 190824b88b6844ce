//! FTS5 index methods on SearchApi.

use crate::error::{Result, SearchError};
use crate::index::{self, Fts5Command, Fts5IndexReport, Fts5IndexSpec};
use crate::SearchApi;
use tracing::info;

impl SearchApi {
    // ========================================
    // Index Methods
    // ========================================

    /// Build an FTS5 table over an ordinary table, then refresh the whitelist.
    pub async fn create_fts_index(&self, spec: Fts5IndexSpec) -> Result<Fts5IndexReport> {
        let db = self.state.current().ok_or(SearchError::NotConnected)?;

        let report = db
            .call_mut(move |tx| index::create_index(tx, &spec))
            .await?;

        self.state.schema.refresh_tables(&db).await?;
        Ok(report)
    }

    /// Merge the index b-trees of a whitelisted FTS5 table.
    pub async fn optimize_fts_index(&self, table: &str) -> Result<()> {
        self.run_fts_command(table, Fts5Command::Optimize).await
    }

    /// Rebuild a whitelisted FTS5 table from its content.
    pub async fn rebuild_fts_index(&self, table: &str) -> Result<()> {
        self.run_fts_command(table, Fts5Command::Rebuild).await
    }

    async fn run_fts_command(&self, table: &str, command: Fts5Command) -> Result<()> {
        let db = self.state.current().ok_or(SearchError::NotConnected)?;

        let whitelist = self.state.schema.snapshot();
        if whitelist.generation() != db.generation() || !whitelist.contains(table) {
            return Err(SearchError::UnknownTable {
                table: table.to_string(),
            });
        }

        let name = table.to_string();
        db.call(move |conn| index::run_command(conn, &name, command))
            .await?;
        info!("FTS5 {} completed on {}", command.as_str(), table);
        Ok(())
    }
}
