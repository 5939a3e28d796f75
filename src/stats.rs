//! Connection statistics.
//!
//! Aggregates over the connections source: top companies, titles and
//! industries, a monthly histogram of when connections were added, and
//! trailing-window counts. Used by `eqa stats`. A missing store yields empty
//! statistics rather than an error.

use anyhow::Result;
use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::Config;
use crate::connections::parse_connection_date;
use crate::models::StoredDocument;
use crate::store::{SqliteStore, Store};

/// A value and how many connections carry it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Tally {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthCount {
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub top_companies: Vec<Tally>,
    pub top_titles: Vec<Tally>,
    pub top_industries: Vec<Tally>,
    pub connections_by_month: Vec<MonthCount>,
    pub recent_counts: BTreeMap<String, usize>,
}

const RECENT_WINDOWS: &[(&str, i64)] = &[("30d", 30), ("90d", 90), ("365d", 365)];

/// Compute statistics for the store at `config.store.path`.
pub async fn collect_stats(config: &Config) -> Result<Stats> {
    if !config.store.path.exists() {
        return Ok(Stats::default());
    }
    let store = SqliteStore::open(&config.store.path).await?;
    let docs = store
        .documents_in_source(&config.sources.connections)
        .await;
    store.close().await;

    let now = Local::now().naive_local();
    Ok(compute_stats(
        &docs?,
        config.limits.stats_top,
        config.limits.stats_months,
        now,
    ))
}

pub fn compute_stats(
    docs: &[StoredDocument],
    top: usize,
    months: usize,
    now: NaiveDateTime,
) -> Stats {
    Stats {
        top_companies: top_values(docs, "Company", top),
        top_titles: top_values(docs, "Position", top),
        top_industries: top_values(docs, "Industry", top),
        connections_by_month: by_month(docs, months),
        recent_counts: recent_counts(docs, now),
    }
}

/// Most frequent non-empty values of `field`. Ties keep first-seen order.
pub fn top_values(docs: &[StoredDocument], field: &str, limit: usize) -> Vec<Tally> {
    let mut tallies: Vec<Tally> = Vec::new();
    for doc in docs {
        let value = doc.fields.text(field).trim();
        if value.is_empty() {
            continue;
        }
        match tallies.iter_mut().find(|t| t.name == value) {
            Some(t) => t.count += 1,
            None => tallies.push(Tally {
                name: value.to_string(),
                count: 1,
            }),
        }
    }
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies.truncate(limit);
    tallies
}

/// Connections per `YYYY-MM`, ascending, keeping the most recent `limit`
/// months.
pub fn by_month(docs: &[StoredDocument], limit: usize) -> Vec<MonthCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for doc in docs {
        if let Some(date) = parse_connection_date(doc.fields.text("Connected On")) {
            *counts.entry(date.format("%Y-%m").to_string()).or_default() += 1;
        }
    }
    let skip = counts.len().saturating_sub(limit);
    counts
        .into_iter()
        .skip(skip)
        .map(|(month, count)| MonthCount { month, count })
        .collect()
}

/// Connections added within the last 30, 90 and 365 days. Each window is
/// counted independently and includes both ends.
pub fn recent_counts(docs: &[StoredDocument], now: NaiveDateTime) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = RECENT_WINDOWS
        .iter()
        .map(|(key, _)| (key.to_string(), 0))
        .collect();

    for doc in docs {
        let Some(date) = parse_connection_date(doc.fields.text("Connected On")) else {
            continue;
        };
        // Whole days, rounded down so future dates stay negative.
        let age = (now - date.and_time(NaiveTime::MIN))
            .num_seconds()
            .div_euclid(86_400);
        for (key, days) in RECENT_WINDOWS {
            if (0..=*days).contains(&age) {
                if let Some(count) = counts.get_mut(*key) {
                    *count += 1;
                }
            }
        }
    }
    counts
}

/// Print statistics in the CLI's plain-text layout.
pub fn print_stats(config: &Config, stats: &Stats) {
    println!("Export Q&A: Connection Stats");
    println!("============================");
    println!();
    println!("  Store:       {}", config.store.path.display());
    println!();

    for (heading, tallies) in [
        ("Top companies", &stats.top_companies),
        ("Top titles", &stats.top_titles),
        ("Top industries", &stats.top_industries),
    ] {
        println!("  {}:", heading);
        if tallies.is_empty() {
            println!("    (none)");
        }
        for t in tallies {
            println!("    {:<40} {:>6}", t.name, t.count);
        }
        println!();
    }

    println!("  Connections by month:");
    if stats.connections_by_month.is_empty() {
        println!("    (none)");
    }
    for m in &stats.connections_by_month {
        println!("    {}  {:>6}", m.month, m.count);
    }
    println!();

    println!("  Recently added:");
    for (key, _) in RECENT_WINDOWS {
        let count = stats.recent_counts.get(*key).copied().unwrap_or(0);
        println!("    {:<6} {:>6}", key, count);
    }
}
