//! Article strategies: totals, date windows and length-based popularity.
//!
//! Articles are the documents whose source path starts with the configured
//! articles prefix.

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Match, StoredDocument};
use crate::store::Store;

static CREATED_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Created on\s+(\d{4}-\d{2}-\d{2})(?:\s+(\d{2}:\d{2}))?").unwrap()
});

static FILENAME_STAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2})").unwrap());

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]+").unwrap());

/// Articles created within a trailing window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatedArticles {
    pub count: usize,
    /// At most `limit` of the counted articles, in store order.
    pub matches: Vec<Match>,
    /// Articles with no recoverable creation time.
    pub missing: usize,
}

pub async fn count_all(store: &dyn Store, prefix: &str) -> Result<i64> {
    store.count_with_prefix(prefix).await
}

/// Count articles created at or after `now - days`. A window reaching past
/// the representable date range has no lower bound.
pub async fn articles_in_last_days(
    store: &dyn Store,
    prefix: &str,
    days: u32,
    limit: usize,
    now: NaiveDateTime,
) -> Result<DatedArticles> {
    let docs = store.documents_with_prefix(prefix).await?;
    Ok(dated_within(&docs, days, limit, now))
}

fn dated_within(
    docs: &[StoredDocument],
    days: u32,
    limit: usize,
    now: NaiveDateTime,
) -> DatedArticles {
    let cutoff = now.checked_sub_signed(Duration::days(i64::from(days)));
    let mut result = DatedArticles::default();

    for doc in docs {
        let Some(created) = article_created(&doc.body, &doc.source_file) else {
            result.missing += 1;
            continue;
        };
        if cutoff.is_some_and(|cutoff| created < cutoff) {
            continue;
        }
        result.count += 1;
        if result.matches.len() < limit {
            result.matches.push(Match::new(
                doc.source_file.clone(),
                doc.row_id,
                doc.title.clone(),
                format!("Created on: {}", created.format("%Y-%m-%d %H:%M")),
            ));
        }
    }
    result
}

/// Longest articles first, as a stand-in for popularity. Articles without
/// any words are left out.
pub async fn most_popular(store: &dyn Store, prefix: &str, limit: usize) -> Result<Vec<Match>> {
    let docs = store.documents_with_prefix(prefix).await?;
    Ok(longest_first(&docs, limit))
}

fn longest_first(docs: &[StoredDocument], limit: usize) -> Vec<Match> {
    let mut ranked: Vec<(usize, &StoredDocument)> = docs
        .iter()
        .map(|doc| (word_count(&doc.body), doc))
        .filter(|(words, _)| *words > 0)
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked
        .into_iter()
        .take(limit)
        .map(|(words, doc)| {
            Match::new(
                doc.source_file.clone(),
                doc.row_id,
                doc.title.clone(),
                format!("Length estimate: {} words", words),
            )
        })
        .collect()
}

pub fn word_count(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// Creation time of an article: a `Created on YYYY-MM-DD[ HH:MM]` marker in
/// the body, else a `YYYY-MM-DD HH:MM:SS` prefix on the file name.
pub fn article_created(body: &str, source_file: &str) -> Option<NaiveDateTime> {
    if let Some(caps) = CREATED_ON.captures(body) {
        let time = caps.get(2).map(|m| m.as_str()).unwrap_or("00:00");
        let stamp = format!("{} {}", &caps[1], time);
        if let Ok(created) = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M") {
            return Some(created);
        }
    }

    let filename = source_file.rsplit('/').next().unwrap_or(source_file);
    let caps = FILENAME_STAMP.captures(filename)?;
    let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(&caps[2], "%H:%M:%S").ok()?;
    Some(date.and_time(time))
}
