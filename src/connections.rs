//! Connection lookups: by company, by several companies, and by recency.
//!
//! Company matching is a two-tier substring search over the document body:
//! first the strict `"company: <name>"` field line, then, only when that
//! finds nothing, the bare name anywhere in the body. The loose tier can
//! return rows that merely mention the name elsewhere.

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashSet;

use crate::models::{Match, StoredDocument};
use crate::store::Store;

fn strict_needle(company: &str) -> String {
    format!("company: {}", company)
}

/// Up to `limit` connections whose company matches `company`, in row order.
pub async fn connections_at(
    store: &dyn Store,
    source: &str,
    company: &str,
    limit: usize,
) -> Result<Vec<Match>> {
    let mut docs = store
        .documents_containing(source, &strict_needle(company), Some(limit))
        .await?;
    if docs.is_empty() {
        docs = store
            .documents_containing(source, company, Some(limit))
            .await?;
    }
    Ok(docs.iter().map(format_connection).collect())
}

/// Count of connections whose company matches `company`, with the same
/// strict-then-loose fallback as [`connections_at`].
pub async fn count_at(store: &dyn Store, source: &str, company: &str) -> Result<i64> {
    let strict = store.count_containing(source, &strict_needle(company)).await?;
    if strict > 0 {
        return Ok(strict);
    }
    store.count_containing(source, company).await
}

/// Number of connections whose row matches every company strictly.
pub async fn count_at_all(store: &dyn Store, source: &str, companies: &[String]) -> Result<usize> {
    let mut intersection: Option<HashSet<i64>> = None;
    for company in companies {
        let rows: HashSet<i64> = store
            .documents_containing(source, &strict_needle(company), None)
            .await?
            .into_iter()
            .map(|doc| doc.row_id)
            .collect();
        intersection = Some(match intersection {
            Some(acc) => acc.intersection(&rows).copied().collect(),
            None => rows,
        });
    }
    Ok(intersection.map(|s| s.len()).unwrap_or(0))
}

/// Union of per-company lookups, deduplicated and capped at `limit`.
///
/// Each company gets `max(5, limit / companies.len())` rows; every match
/// records the company that produced it.
pub async fn connections_at_any(
    store: &dyn Store,
    source: &str,
    companies: &[String],
    limit: usize,
) -> Result<Vec<Match>> {
    let per_company = (limit / companies.len().max(1)).max(5);
    let mut seen: HashSet<(String, i64)> = HashSet::new();
    let mut matches = Vec::new();

    for company in companies {
        for mut m in connections_at(store, source, company, per_company).await? {
            if !seen.insert((m.source_file.clone(), m.row_id)) {
                continue;
            }
            m.snippet = format!("Company match: {}\n{}", company, m.snippet)
                .trim()
                .to_string();
            m.matched_company = Some(company.clone());
            matches.push(m);
            if matches.len() >= limit {
                return Ok(matches);
            }
        }
    }
    Ok(matches)
}

/// Most recently added connections, newest first. Undated rows are skipped.
pub async fn recent_connections(
    store: &dyn Store,
    source: &str,
    limit: usize,
) -> Result<Vec<Match>> {
    let docs = store.documents_in_source(source).await?;
    Ok(newest_first(docs.iter(), limit))
}

/// Most recent connections whose `Company` field equals `company`
/// case-insensitively.
pub async fn recent_connections_at(
    store: &dyn Store,
    source: &str,
    company: &str,
    limit: usize,
) -> Result<Vec<Match>> {
    let wanted = company.to_lowercase();
    let docs = store.documents_in_source(source).await?;
    let at_company = docs.iter().filter(|doc| {
        let value = doc.fields.text("Company");
        !value.is_empty() && value.to_lowercase() == wanted
    });
    Ok(newest_first(at_company, limit))
}

fn newest_first<'a>(docs: impl Iterator<Item = &'a StoredDocument>, limit: usize) -> Vec<Match> {
    let mut dated: Vec<(NaiveDate, Match)> = docs
        .filter_map(|doc| {
            let raw = doc.fields.text("Connected On");
            let date = parse_connection_date(raw)?;
            let mut m = format_connection(doc);
            m.connected_on = Some(raw.to_string());
            Some((date, m))
        })
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.into_iter().take(limit).map(|(_, m)| m).collect()
}

/// Parse a `Connected On` value such as `05 Jan 2024` or `05 January 2024`.
pub fn parse_connection_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    ["%d %b %Y", "%d %B %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Present a connection document as a [`Match`].
pub fn format_connection(doc: &StoredDocument) -> Match {
    let fields = &doc.fields;
    let name = [fields.text("First Name").trim(), fields.text("Last Name").trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let title = if !name.is_empty() {
        name
    } else if !doc.title.is_empty() {
        doc.title.clone()
    } else {
        "Connection".to_string()
    };

    let snippet = ["Position", "Company", "Connected On", "URL"]
        .iter()
        .filter_map(|key| {
            let value = fields.text(key);
            (!value.is_empty()).then(|| format!("{}: {}", key, value))
        })
        .collect::<Vec<_>>()
        .join("\n");

    Match::new(doc.source_file.clone(), doc.row_id, title, snippet)
}
