use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::session::SessionPaths;

/// Immutable configuration for one logical session: where the export lives,
/// where its store is built, and how large each answer may get.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_connections")]
    pub connections: String,
    #[serde(default = "default_articles_prefix")]
    pub articles_prefix: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            connections: default_connections(),
            articles_prefix: default_articles_prefix(),
        }
    }
}

fn default_connections() -> String {
    "Connections.csv".to_string()
}
fn default_articles_prefix() -> String {
    "Articles/Articles/".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_search")]
    pub search: usize,
    #[serde(default = "default_company")]
    pub company: usize,
    #[serde(default = "default_multi_company")]
    pub multi_company: usize,
    #[serde(default = "default_recent_company")]
    pub recent_company: usize,
    #[serde(default = "default_recent")]
    pub recent: usize,
    #[serde(default = "default_dated_articles")]
    pub dated_articles: usize,
    #[serde(default = "default_popular_articles")]
    pub popular_articles: usize,
    #[serde(default = "default_themes")]
    pub themes: usize,
    #[serde(default = "default_stats_top")]
    pub stats_top: usize,
    #[serde(default = "default_stats_months")]
    pub stats_months: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            search: default_search(),
            company: default_company(),
            multi_company: default_multi_company(),
            recent_company: default_recent_company(),
            recent: default_recent(),
            dated_articles: default_dated_articles(),
            popular_articles: default_popular_articles(),
            themes: default_themes(),
            stats_top: default_stats_top(),
            stats_months: default_stats_months(),
        }
    }
}

fn default_search() -> usize {
    8
}
fn default_company() -> usize {
    50
}
fn default_multi_company() -> usize {
    80
}
fn default_recent_company() -> usize {
    5
}
fn default_recent() -> usize {
    10
}
fn default_dated_articles() -> usize {
    10
}
fn default_popular_articles() -> usize {
    5
}
fn default_themes() -> usize {
    8
}
fn default_stats_top() -> usize {
    8
}
fn default_stats_months() -> usize {
    12
}

impl Config {
    /// Default configuration for an explicit store/export pair.
    pub fn new(store_path: impl Into<PathBuf>, export_root: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig {
                path: store_path.into(),
            },
            export: ExportConfig {
                root: export_root.into(),
            },
            sources: SourcesConfig::default(),
            limits: LimitsConfig::default(),
        }
    }

    /// Copy of this configuration pointed at one session's store and export.
    pub fn for_session(&self, paths: &SessionPaths) -> Self {
        let mut cfg = self.clone();
        cfg.store.path = paths.store_path.clone();
        cfg.export.root = paths.export_root.clone();
        cfg
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.store.path.as_os_str().is_empty() {
        anyhow::bail!("store.path must not be empty");
    }
    if config.export.root.as_os_str().is_empty() {
        anyhow::bail!("export.root must not be empty");
    }
    if config.sources.connections.trim().is_empty() {
        anyhow::bail!("sources.connections must not be empty");
    }

    let limits = &config.limits;
    for (name, value) in [
        ("search", limits.search),
        ("company", limits.company),
        ("multi_company", limits.multi_company),
        ("recent_company", limits.recent_company),
        ("recent", limits.recent),
        ("dated_articles", limits.dated_articles),
        ("popular_articles", limits.popular_articles),
        ("themes", limits.themes),
        ("stats_top", limits.stats_top),
        ("stats_months", limits.stats_months),
    ] {
        if value < 1 {
            anyhow::bail!("limits.{} must be >= 1", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[store]
path = "data/export.sqlite"

[export]
root = "export"
"#,
        )
        .unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.sources.connections, "Connections.csv");
        assert_eq!(cfg.sources.articles_prefix, "Articles/Articles/");
        assert_eq!(cfg.limits.search, 8);
        assert_eq!(cfg.limits.multi_company, 80);
        assert_eq!(cfg.limits.stats_months, 12);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let cfg: Config = toml::from_str(
            r#"
[store]
path = "a.sqlite"

[export]
root = "export"

[limits]
themes = 0
"#,
        )
        .unwrap();
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("limits.themes"));
    }

    #[test]
    fn test_for_session_overrides_paths_only() {
        let base = Config::new("base.sqlite", "base-export");
        let paths = SessionPaths {
            session_root: PathBuf::from("/tmp/s1"),
            export_root: PathBuf::from("/tmp/s1/export"),
            store_path: PathBuf::from("/tmp/s1/linkedin.sqlite"),
        };
        let cfg = base.for_session(&paths);
        assert_eq!(cfg.store.path, PathBuf::from("/tmp/s1/linkedin.sqlite"));
        assert_eq!(cfg.export.root, PathBuf::from("/tmp/s1/export"));
        assert_eq!(cfg.limits.company, base.limits.company);
    }
}
