//! Named source aliases and source metadata lookups.

use anyhow::Result;
use tracing::debug;

use crate::config::Config;
use crate::models::SourceSummary;
use crate::store::{SqliteStore, Store};

/// Phrase → export file. Matched longest phrase first so that
/// "profile summary" wins over "profile".
pub const SOURCE_ALIASES: &[(&str, &str)] = &[
    ("connections", "Connections.csv"),
    ("connection", "Connections.csv"),
    ("positions", "Positions.csv"),
    ("position", "Positions.csv"),
    ("profile", "Profile.csv"),
    ("profile summary", "Profile Summary.csv"),
    ("recommendations", "Recommendations_Given.csv"),
    ("recommendation", "Recommendations_Given.csv"),
    ("learning", "Learning.csv"),
    ("courses", "Learning.csv"),
    ("events", "Events.csv"),
    ("company follows", "Company Follows.csv"),
    ("ad targeting", "Ad_Targeting.csv"),
    ("email addresses", "Email Addresses.csv"),
    ("phone numbers", "PhoneNumbers.csv"),
    ("whatsapp", "Whatsapp Phone Numbers.csv"),
    ("job applications", "Jobs/Job Applications.csv"),
    ("saved jobs", "Jobs/Saved Jobs.csv"),
    ("job seeker preferences", "Jobs/Job Seeker Preferences.csv"),
    (
        "screening questions",
        "Job Applicant Saved Screening Question Responses.csv",
    ),
    ("saved answers", "Jobs/Job Applicant Saved Answers.csv"),
];

/// First alias (longest first, stable among equal lengths) contained in the
/// lowercased text.
pub fn infer_source(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    let mut aliases: Vec<&(&str, &str)> = SOURCE_ALIASES.iter().collect();
    aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    aliases
        .into_iter()
        .find(|(alias, _)| lowered.contains(alias))
        .map(|(_, file)| *file)
}

/// Resolve an alias or a literal source file name.
pub fn resolve_alias(alias: &str) -> Option<&'static str> {
    let wanted = alias.trim().to_lowercase();
    SOURCE_ALIASES
        .iter()
        .find(|(a, file)| *a == wanted || file.to_lowercase() == wanted)
        .map(|(_, file)| *file)
        .or_else(|| infer_source(&wanted))
}

/// Row count for the source named by `alias`, or `None` when the alias is
/// unknown, the source was never ingested, or no store exists yet.
pub async fn row_count(config: &Config, alias: &str) -> Result<Option<i64>> {
    let Some(source_file) = resolve_alias(alias) else {
        debug!(alias, "unknown source alias");
        return Ok(None);
    };
    if !config.store.path.exists() {
        return Ok(None);
    }
    let store = SqliteStore::open(&config.store.path).await?;
    let count = store.source_row_count(source_file).await;
    store.close().await;
    count
}

/// Every ingested source, ordered by file name. Empty when no store exists.
pub async fn list_sources(config: &Config) -> Result<Vec<SourceSummary>> {
    if !config.store.path.exists() {
        return Ok(Vec::new());
    }
    let store = SqliteStore::open(&config.store.path).await?;
    let sources = store.sources().await;
    store.close().await;
    sources
}
