//! Schema and search methods on SearchApi.

use crate::error::{Result, SearchError};
use crate::query::{self, CompiledQuery};
use crate::schema::ColumnDescriptor;
use crate::search::{SearchGateway, SearchOutcome, SearchRequest};
use crate::SearchApi;

impl SearchApi {
    // ========================================
    // Schema Methods
    // ========================================

    /// Columns of a whitelisted table, in declaration order.
    pub async fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let db = self.state.current().ok_or(SearchError::NotConnected)?;
        let columns = self.state.schema.columns_for(&db, table).await?;
        Ok(columns.to_vec())
    }

    /// Re-select `table`: drop its cached columns and read them again.
    pub async fn select_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let db = self.state.current().ok_or(SearchError::NotConnected)?;
        if !self.state.schema.is_known_table(table) {
            return Err(SearchError::UnknownTable {
                table: table.to_string(),
            });
        }
        self.state.schema.evict_table(table);
        let columns = self.state.schema.columns_for(&db, table).await?;
        Ok(columns.to_vec())
    }

    /// True if `name` is a whitelisted FTS5 table.
    pub fn is_known_table(&self, name: &str) -> bool {
        self.state.schema.is_known_table(name)
    }

    /// True only if every name is a cached column of a whitelisted `table`.
    pub fn are_known_columns<S: AsRef<str>>(&self, table: &str, names: &[S]) -> bool {
        self.state.schema.are_known_columns(table, names)
    }

    // ========================================
    // Search Methods
    // ========================================

    /// Search `columns` of `table` for `raw_term`, returning every match.
    pub async fn search<S: AsRef<str>>(
        &self,
        raw_term: &str,
        table: &str,
        columns: &[S],
    ) -> Result<SearchOutcome> {
        let request = SearchRequest::new(raw_term, table, columns.iter().map(|c| c.as_ref()));
        self.search_with(&request).await
    }

    /// Run a fully specified search request.
    pub async fn search_with(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        SearchGateway::new(&self.state.schema)
            .execute(self.state.current(), request)
            .await
    }

    /// Preview the match expression a search would bind. Touches no storage.
    pub fn compile_query<S: AsRef<str>>(&self, raw_term: &str, columns: &[S]) -> Result<CompiledQuery> {
        query::compile_query(raw_term, columns)
    }
}
