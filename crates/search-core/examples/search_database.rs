//! Search an FTS5 table in an existing database
//!
//! Usage: search_database <db-path> <table> <query> [column...]

use sqlite_search::{Result, SearchApi};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).map(|s| s.as_str()).unwrap_or("./example.db");
    let table = args.get(2).map(|s| s.as_str()).unwrap_or("documents_fts");
    let query = args.get(3).map(|s| s.as_str()).unwrap_or("hello");

    println!("Opening {}", path);
    let api = SearchApi::open(path).await?;

    let tables = api.refresh_whitelist().await?;
    println!("Searchable tables: {}", tables.join(", "));

    // Search every column unless some were named.
    let columns: Vec<String> = if args.len() > 4 {
        args[4..].to_vec()
    } else {
        api.list_columns(table)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect()
    };

    let outcome = api.search(query, table, &columns).await?;
    println!(
        "{} rows for {} ({:.1} ms)",
        outcome.rows.len(),
        outcome.match_expression,
        outcome.query_time_ms
    );
    for row in outcome.rows.iter().take(20) {
        println!("  #{} {}", row.rowid, serde_json::to_string(row)?);
    }

    Ok(())
}
