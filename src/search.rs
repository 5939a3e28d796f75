//! Generic keyword search over the whole export.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use crate::models::Match;
use crate::store::Store;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9][a-z0-9\-+]*").unwrap());

const MAX_TOKENS: usize = 15;

/// Build an FTS5 query from free text.
///
/// Each token is quoted so punctuation inside it is matched literally and
/// never parsed as query syntax. Returns `None` when the text has no
/// tokens.
pub fn build_fts_query(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<String> = TOKEN
        .find_iter(&lowered)
        .take(MAX_TOKENS)
        .map(|m| format!("\"{}\"", m.as_str()))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Ranked keyword search, optionally restricted to one source file.
pub async fn search_documents(
    store: &dyn Store,
    text: &str,
    source: Option<&str>,
    limit: usize,
) -> Result<Vec<Match>> {
    let Some(query) = build_fts_query(text) else {
        return Ok(Vec::new());
    };
    store.keyword_search(&query, source, limit).await
}
