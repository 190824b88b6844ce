//! Integration tests for the SearchApi public interface.
//!
//! These tests run the full path from a collaborator call down to an on-disk
//! SQLite database: connection swaps, whitelist gating, compilation and
//! execution.

use rusqlite::Connection;
use sqlite_search::{CellValue, Fts5IndexSpec, SearchApi, SearchError, SearchRequest};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a database with two FTS5 tables and one ordinary table.
fn create_genes_db(dir: &Path) -> PathBuf {
    let path = dir.join("genes.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE genes (
            id INTEGER PRIMARY KEY,
            symbol TEXT,
            accession TEXT,
            summary TEXT
         );
         INSERT INTO genes (symbol, accession, summary) VALUES
            ('BRCA1', 'NM_007294.4', 'DNA repair associated, breast cancer susceptibility'),
            ('BRCA2', 'NM_000059.4', 'DNA repair associated'),
            ('TP53', 'NM_000546.6', 'tumor protein p53, guardian of the genome'),
            ('EGFR', 'NM_005228.5', 'epidermal growth factor receptor');
         CREATE VIRTUAL TABLE genes_fts USING fts5(
            symbol, accession, summary, content='genes', content_rowid='id'
         );
         INSERT INTO genes_fts(genes_fts) VALUES('rebuild');
         CREATE VIRTUAL TABLE \"lab notes\" USING fts5(title, \"first name\");
         INSERT INTO \"lab notes\" VALUES ('X-ray diffraction of DNA fibres', 'Rosalind');
         INSERT INTO \"lab notes\" VALUES ('Double helix model', 'Francis');",
    )
    .unwrap();
    path
}

/// Create a second database with a different FTS5 table.
fn create_papers_db(dir: &Path) -> PathBuf {
    let path = dir.join("papers.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE VIRTUAL TABLE papers USING fts5(title, abstract);
         INSERT INTO papers VALUES ('Attention is all you need', 'transformers');",
    )
    .unwrap();
    path
}

async fn open_genes() -> (SearchApi, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = create_genes_db(temp_dir.path());
    let api = SearchApi::open(&path).await.unwrap();
    (api, temp_dir)
}

fn storage_calls(api: &SearchApi) -> u64 {
    api.connection_info().unwrap().storage_calls
}

#[tokio::test]
async fn test_open_populates_whitelist() {
    let (api, _temp) = open_genes().await;

    assert!(api.is_connected());
    assert!(api.is_known_table("genes_fts"));
    assert!(api.is_known_table("lab notes"));
    assert!(!api.is_known_table("genes"));

    let info = api.connection_info().unwrap();
    assert_eq!(info.whitelist_size, 2);
    assert!(info.path.ends_with("genes.db"));
}

#[tokio::test]
async fn test_refresh_whitelist_lists_fts_tables() {
    let (api, _temp) = open_genes().await;
    let tables = api.refresh_whitelist().await.unwrap();
    assert_eq!(tables, vec!["genes_fts".to_string(), "lab notes".to_string()]);
}

#[tokio::test]
async fn test_search_boolean_with_special_operand() {
    let (api, _temp) = open_genes().await;

    let outcome = api
        .search("BRCA1 AND NM_007294.4", "genes_fts", &["symbol", "accession"])
        .await
        .unwrap();

    assert_eq!(
        outcome.match_expression,
        "{symbol accession}: BRCA1 AND \"NM_007294.4\""
    );
    assert_eq!(outcome.columns, vec!["symbol", "accession", "summary"]);
    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].rowid, 1);
    assert_eq!(
        outcome.rows[0].get("symbol"),
        Some(&CellValue::Text("BRCA1".to_string()))
    );
}

#[tokio::test]
async fn test_search_literal_phrase() {
    let (api, _temp) = open_genes().await;

    let outcome = api
        .search("dna repair", "genes_fts", &["summary"])
        .await
        .unwrap();
    assert_eq!(outcome.match_expression, "{summary}: \"dna repair\"");
    assert_eq!(outcome.rows.len(), 2);

    // Lowercase operators are plain words.
    let outcome = api
        .search("growth and receptor", "genes_fts", &["summary"])
        .await
        .unwrap();
    assert_eq!(outcome.rows.len(), 0);
}

#[tokio::test]
async fn test_search_prefix() {
    let (api, _temp) = open_genes().await;

    let outcome = api.search("brca*", "genes_fts", &["symbol"]).await.unwrap();
    assert_eq!(outcome.match_expression, "{symbol}: brca*");
    assert_eq!(outcome.rows.len(), 2);
}

#[tokio::test]
async fn test_search_column_scope() {
    let (api, _temp) = open_genes().await;

    // "tumor" only appears in summary.
    let outcome = api.search("tumor", "genes_fts", &["symbol"]).await.unwrap();
    assert!(outcome.rows.is_empty());

    let outcome = api.search("tumor", "genes_fts", &["summary"]).await.unwrap();
    assert_eq!(outcome.rows.len(), 1);
}

#[tokio::test]
async fn test_search_with_limit() {
    let (api, _temp) = open_genes().await;

    let request = SearchRequest::new("dna", "genes_fts", ["summary"]).with_limit(1);
    let outcome = api.search_with(&request).await.unwrap();
    assert_eq!(outcome.rows.len(), 1);
}

#[tokio::test]
async fn test_search_awkward_identifiers() {
    let (api, _temp) = open_genes().await;

    let outcome = api
        .search("Rosalind", "lab notes", &["first name"])
        .await
        .unwrap();
    assert_eq!(outcome.match_expression, "{\"first name\"}: \"Rosalind\"");
    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(
        outcome.rows[0].get("title").and_then(CellValue::as_text),
        Some("X-ray diffraction of DNA fibres")
    );
}

#[tokio::test]
async fn test_unknown_table_makes_no_storage_calls() {
    let (api, _temp) = open_genes().await;
    let before = storage_calls(&api);

    let result = api.search("x", "not_a_real_table", &["c"]).await;
    assert!(matches!(result, Err(SearchError::UnknownTable { .. })));

    // An ordinary table is not searchable either.
    let result = api.search("x", "genes", &["symbol"]).await;
    assert!(matches!(result, Err(SearchError::UnknownTable { .. })));

    let result = api
        .search("x", "genes_fts\"; DROP TABLE genes; --", &["symbol"])
        .await;
    assert!(matches!(result, Err(SearchError::UnknownTable { .. })));

    assert_eq!(storage_calls(&api), before);
}

#[tokio::test]
async fn test_unknown_column_rejected_before_execution() {
    let (api, _temp) = open_genes().await;

    // Warm the column cache so the rejection needs no storage at all.
    api.list_columns("genes_fts").await.unwrap();
    let before = storage_calls(&api);

    let result = api
        .search("x", "genes_fts", &["symbol", "author"])
        .await;
    match result {
        Err(SearchError::UnknownColumn { table, column }) => {
            assert_eq!(table, "genes_fts");
            assert_eq!(column, "author");
        }
        other => panic!("expected UnknownColumn, got {:?}", other),
    }
    assert_eq!(storage_calls(&api), before);
}

#[tokio::test]
async fn test_gate_order() {
    let api = SearchApi::new();
    // Not connected wins over every other problem.
    assert!(matches!(
        api.search("", "nope", &["c"]).await,
        Err(SearchError::NotConnected)
    ));

    let (api, _temp) = open_genes().await;
    // Empty query is checked before the table.
    assert!(matches!(
        api.search("   ", "nope", &["c"]).await,
        Err(SearchError::EmptyQuery)
    ));
    // Empty column set surfaces after the whitelist gates.
    let none: [&str; 0] = [];
    assert!(matches!(
        api.search("dna", "genes_fts", &none).await,
        Err(SearchError::EmptyColumnSet)
    ));
}

#[tokio::test]
async fn test_engine_syntax_error_surfaces() {
    let (api, _temp) = open_genes().await;

    let result = api.search("dna AND", "genes_fts", &["summary"]).await;
    match result {
        Err(SearchError::EngineSyntax { message }) => assert!(!message.is_empty()),
        other => panic!("expected EngineSyntax, got {:?}", other),
    }

    // The connection stays usable.
    assert!(api.search("dna", "genes_fts", &["summary"]).await.is_ok());
}

#[tokio::test]
async fn test_disconnect_then_search_not_connected() {
    let (api, _temp) = open_genes().await;
    api.list_columns("genes_fts").await.unwrap();

    let tables = api.on_connection_changed(None).await.unwrap();
    assert!(tables.is_empty());
    assert!(!api.is_connected());
    assert!(api.connection_info().is_none());
    assert!(!api.is_known_table("genes_fts"));
    assert!(!api.are_known_columns("genes_fts", &["symbol"]));

    assert!(matches!(
        api.search("dna", "genes_fts", &["summary"]).await,
        Err(SearchError::NotConnected)
    ));
    assert!(matches!(
        api.refresh_whitelist().await,
        Err(SearchError::NotConnected)
    ));
    assert!(matches!(
        api.list_columns("genes_fts").await,
        Err(SearchError::NotConnected)
    ));
}

#[tokio::test]
async fn test_connection_swap_replaces_whitelist() {
    let temp_dir = TempDir::new().unwrap();
    let genes = create_genes_db(temp_dir.path());
    let papers = create_papers_db(temp_dir.path());

    let api = SearchApi::open(&genes).await.unwrap();
    let first_generation = api.connection_info().unwrap().generation;

    let tables = api.on_connection_changed(Some(papers.as_path())).await.unwrap();
    assert_eq!(tables, vec!["papers".to_string()]);
    assert!(api.connection_info().unwrap().generation > first_generation);

    assert!(matches!(
        api.search("dna", "genes_fts", &["summary"]).await,
        Err(SearchError::UnknownTable { .. })
    ));
    let outcome = api
        .search("attention", "papers", &["title"])
        .await
        .unwrap();
    assert_eq!(outcome.rows.len(), 1);
}

#[tokio::test]
async fn test_connect_to_missing_file_leaves_disconnected() {
    let (api, temp) = open_genes().await;

    let result = api
        .on_connection_changed(Some(temp.path().join("missing.db").as_path()))
        .await;
    assert!(matches!(result, Err(SearchError::Connection { .. })));
    assert!(!api.is_connected());
    assert!(!api.is_known_table("genes_fts"));
}

#[tokio::test]
async fn test_list_and_select_columns() {
    let (api, _temp) = open_genes().await;

    let columns = api.list_columns("genes_fts").await.unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["symbol", "accession", "summary"]);
    assert!(api.are_known_columns("genes_fts", &["symbol", "summary"]));

    let before = storage_calls(&api);
    api.list_columns("genes_fts").await.unwrap();
    assert_eq!(storage_calls(&api), before);

    // Re-selecting reads the catalog again.
    api.select_table("genes_fts").await.unwrap();
    assert_eq!(storage_calls(&api), before + 1);

    assert!(matches!(
        api.select_table("genes").await,
        Err(SearchError::UnknownTable { .. })
    ));
}

#[tokio::test]
async fn test_refresh_picks_up_new_tables() {
    let (api, temp) = open_genes().await;

    let conn = Connection::open(temp.path().join("genes.db")).unwrap();
    conn.execute_batch("CREATE VIRTUAL TABLE extra USING fts5(body);")
        .unwrap();
    drop(conn);

    assert!(!api.is_known_table("extra"));
    let tables = api.refresh_whitelist().await.unwrap();
    assert!(tables.contains(&"extra".to_string()));
    assert!(api.is_known_table("extra"));
}

#[tokio::test]
async fn test_compile_query_preview() {
    let api = SearchApi::new();
    let compiled = api
        .compile_query("NM_007294.*", &["accession"])
        .unwrap();
    assert_eq!(compiled.as_str(), "{accession}: \"NM_007294.\"");
}

#[tokio::test]
async fn test_create_fts_index_and_search() {
    let (api, _temp) = open_genes().await;

    let report = api
        .create_fts_index(
            Fts5IndexSpec::new("genes")
                .with_fts_table("genes_summary")
                .with_columns(["summary"]),
        )
        .await
        .unwrap();
    assert_eq!(report.fts_table, "genes_summary");
    assert_eq!(report.row_count, 4);

    // The whitelist was refreshed with the new table.
    assert!(api.is_known_table("genes_summary"));
    let outcome = api
        .search("guardian", "genes_summary", &["summary"])
        .await
        .unwrap();
    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].rowid, 3);

    api.optimize_fts_index("genes_summary").await.unwrap();
    api.rebuild_fts_index("genes_summary").await.unwrap();
}

#[tokio::test]
async fn test_create_fts_index_failure_rolls_back() {
    let (api, _temp) = open_genes().await;

    let result = api
        .create_fts_index(Fts5IndexSpec::new("genes").with_tokenizer("icu"))
        .await;
    assert!(matches!(result, Err(SearchError::Validation { .. })));

    // The existing index is untouched.
    let outcome = api.search("dna", "genes_fts", &["summary"]).await.unwrap();
    assert_eq!(outcome.rows.len(), 2);

    let result = api.create_fts_index(Fts5IndexSpec::new("missing")).await;
    assert!(matches!(result, Err(SearchError::UnknownTable { .. })));
}

#[tokio::test]
async fn test_maintenance_requires_whitelisted_table() {
    let (api, _temp) = open_genes().await;
    let before = storage_calls(&api);

    assert!(matches!(
        api.optimize_fts_index("genes").await,
        Err(SearchError::UnknownTable { .. })
    ));
    assert_eq!(storage_calls(&api), before);
}

#[tokio::test]
async fn test_concurrent_searches() {
    let (api, _temp) = open_genes().await;

    let (a, b, c) = tokio::join!(
        api.search("brca*", "genes_fts", &["symbol"]),
        api.search("dna", "genes_fts", &["summary"]),
        api.search("Francis", "lab notes", &["first name"]),
    );
    assert_eq!(a.unwrap().rows.len(), 2);
    assert_eq!(b.unwrap().rows.len(), 2);
    assert_eq!(c.unwrap().rows.len(), 1);
}
