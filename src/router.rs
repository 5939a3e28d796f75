//! Question classification.
//!
//! A question is matched against [`RULES`], an ordered table of detectors.
//! The first detector that returns an [`Intent`] wins and later rules are
//! never consulted, so the table order is the priority order:
//!
//! | # | Rule | Intent |
//! |---|------|--------|
//! | 1 | `article_themes` | [`Intent::ArticleThemes`] |
//! | 2 | `article_totals` | [`Intent::ArticleTotals`] |
//! | 3 | `articles_recent` | [`Intent::ArticlesInLastDays`] |
//! | 4 | `recent_by_company` | [`Intent::RecentByCompany`] |
//! | 5 | `multi_company` | [`Intent::MultiCompany`] |
//! | 6 | `referral` | [`Intent::Referral`] |
//! | 7 | `company` | [`Intent::Company`] |
//! | 8 | `engagement` | [`Intent::Engagement`] |
//! | 9 | `row_count` | [`Intent::RowCount`] |
//! | 10 | `search` | [`Intent::Search`] |
//!
//! Classification is pure: it never touches the store.

use regex::Regex;
use std::sync::LazyLock;

use crate::sources::infer_source;

static COUNT_QUESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(how many|count|number of|total)\b").unwrap());

static ARTICLE_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"last\s+(\d+)\s+days?").unwrap());

static RECENT_COMPANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)connections?\s+(?:from|at)\s+(.+?)(?:\?|$)").unwrap());

static COMPANY_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)connections?\s+(?:who\s+)?(?:have\s+worked\s+at|work(?:s|ing)?\s+(?:at|for)|employed\s+by|at)\s+(.+?)(?:\?|$)",
    )
    .unwrap()
});

static COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)connections?\s+(?:who\s+)?(?:work(?:s|ing)?\s+(?:at|for)|employed\s+by|at)\s+(.+?)(?:\?|$)",
    )
    .unwrap()
});

static REFER_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)refer\s+me\s+to\s+(.+?)(?:\s+(?:jobs?|roles?|positions?))?(?:\?|$)").unwrap()
});

static REFER_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)refer\s+me\s+.*?\s+at\s+(.+?)(?:\s+(?:jobs?|roles?|positions?))?(?:\?|$)")
        .unwrap()
});

static BOTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bboth\b").unwrap());
static EITHER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\beither\b").unwrap());
static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:and|or)\s+|,\s*").unwrap());
static LEADING_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:both|either)\s+").unwrap());

const THEME_WORDS: &[&str] = &["themes", "summary", "summarize", "topics", "analyze", "concept"];
const POPULARITY_WORDS: &[&str] = &["popular", "most popular", "top", "best performing"];
const TOTAL_WORDS: &[&str] = &["so far", "total", "overall", "to date", "all time"];
const RECENCY_WORDS: &[&str] = &["most recent", "recently", "latest"];
const ENGAGEMENT_WORDS: &[&str] = &["engage", "interaction", "interact", "talk to"];

/// How a multi-company question combines its companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyOp {
    /// Connections at every listed company ("both").
    All,
    /// Connections at any listed company.
    Any,
}

/// The classified shape of a question with its extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ArticleThemes,
    ArticleTotals {
        popular: bool,
    },
    ArticlesInLastDays {
        days: u32,
    },
    RecentByCompany {
        company: String,
    },
    MultiCompany {
        companies: Vec<String>,
        op: CompanyOp,
        count: bool,
    },
    Referral {
        company: String,
    },
    Company {
        company: String,
        count: bool,
    },
    Engagement,
    RowCount {
        source: &'static str,
    },
    Search {
        source: Option<&'static str>,
    },
}

/// A question prepared once for every detector.
#[derive(Debug, Clone)]
pub struct Question {
    /// Trimmed original text; company names are extracted from here so
    /// their casing survives.
    pub raw: String,
    pub lowered: String,
    pub source: Option<&'static str>,
    pub is_count: bool,
}

impl Question {
    pub fn new(text: &str) -> Self {
        let raw = text.trim().to_string();
        let lowered = raw.to_lowercase();
        Self {
            source: infer_source(&raw),
            is_count: is_count_question(&raw),
            lowered,
            raw,
        }
    }

    fn mentions(&self, needle: &str) -> bool {
        self.lowered.contains(needle)
    }

    fn mentions_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.lowered.contains(n))
    }
}

/// One entry of the routing table.
pub struct Rule {
    pub name: &'static str,
    pub detect: fn(&Question) -> Option<Intent>,
}

/// The routing table, highest priority first.
pub static RULES: &[Rule] = &[
    Rule {
        name: "article_themes",
        detect: detect_article_themes,
    },
    Rule {
        name: "article_totals",
        detect: detect_article_totals,
    },
    Rule {
        name: "articles_recent",
        detect: detect_articles_recent,
    },
    Rule {
        name: "recent_by_company",
        detect: detect_recent_by_company,
    },
    Rule {
        name: "multi_company",
        detect: detect_multi_company,
    },
    Rule {
        name: "referral",
        detect: detect_referral,
    },
    Rule {
        name: "company",
        detect: detect_company,
    },
    Rule {
        name: "engagement",
        detect: detect_engagement,
    },
    Rule {
        name: "row_count",
        detect: detect_row_count,
    },
    Rule {
        name: "search",
        detect: detect_search,
    },
];

/// Result of classification: the winning rule's name and its intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub rule: &'static str,
    pub intent: Intent,
}

/// Classify `question`. Returns `None` only for blank input; otherwise the
/// final search rule always matches.
pub fn classify(question: &Question) -> Option<Route> {
    if question.raw.is_empty() {
        return None;
    }
    RULES.iter().find_map(|rule| {
        (rule.detect)(question).map(|intent| Route {
            rule: rule.name,
            intent,
        })
    })
}

pub fn is_count_question(text: &str) -> bool {
    COUNT_QUESTION.is_match(text)
}

fn detect_article_themes(q: &Question) -> Option<Intent> {
    (q.mentions("article") && q.mentions_any(THEME_WORDS)).then_some(Intent::ArticleThemes)
}

fn detect_article_totals(q: &Question) -> Option<Intent> {
    if !q.mentions("article") {
        return None;
    }
    let popular = q.mentions_any(POPULARITY_WORDS);
    let total = q.mentions_any(TOTAL_WORDS) || q.is_count;
    (popular || total).then_some(Intent::ArticleTotals { popular })
}

fn detect_articles_recent(q: &Question) -> Option<Intent> {
    if !q.mentions("article") {
        return None;
    }
    if let Some(caps) = ARTICLE_DAYS.captures(&q.lowered) {
        // Digits only, so the parse fails on overflow alone.
        let days = caps[1].parse::<u32>().unwrap_or(u32::MAX);
        return Some(Intent::ArticlesInLastDays { days });
    }
    q.mentions("last month")
        .then_some(Intent::ArticlesInLastDays { days: 30 })
}

fn detect_recent_by_company(q: &Question) -> Option<Intent> {
    if !q.mentions("connection") || !q.mentions_any(RECENCY_WORDS) {
        return None;
    }
    if !q.mentions(" from ") && !q.mentions(" at ") {
        return None;
    }
    let caps = RECENT_COMPANY.captures(&q.raw)?;
    let company = clean_company(&caps[1])?;
    Some(Intent::RecentByCompany { company })
}

fn detect_multi_company(q: &Question) -> Option<Intent> {
    if !q.mentions("connection") || !q.mentions(" at ") {
        return None;
    }
    let caps = COMPANY_LIST.captures(&q.raw)?;
    let blob = caps[1].trim();

    let mut op = CompanyOp::Any;
    if BOTH.is_match(blob) {
        op = CompanyOp::All;
    }
    if EITHER.is_match(blob) {
        op = CompanyOp::Any;
    }

    let companies: Vec<String> = LIST_SEPARATOR
        .split(blob)
        .filter_map(|part| {
            let part = strip_quotes(part);
            clean_company(&LEADING_OPERATOR.replace(part, ""))
        })
        .collect();
    if companies.len() < 2 {
        return None;
    }
    Some(Intent::MultiCompany {
        companies,
        op,
        count: q.is_count,
    })
}

fn detect_referral(q: &Question) -> Option<Intent> {
    if !q.mentions("refer") {
        return None;
    }
    let caps = REFER_TO
        .captures(&q.raw)
        .or_else(|| REFER_AT.captures(&q.raw))?;
    let company = clean_company(&caps[1])?;
    Some(Intent::Referral { company })
}

fn detect_company(q: &Question) -> Option<Intent> {
    if !q.mentions("connection") {
        return None;
    }
    let company = match COMPANY.captures(&q.raw) {
        Some(caps) => clean_company(&caps[1])?,
        None if q.mentions("connections") => clean_company(text_after_last_at(&q.raw)?)?,
        None => return None,
    };
    Some(Intent::Company {
        company,
        count: q.is_count,
    })
}

fn detect_engagement(q: &Question) -> Option<Intent> {
    (q.mentions_any(ENGAGEMENT_WORDS) && (q.mentions("most") || q.mentions("top")))
        .then_some(Intent::Engagement)
}

fn detect_row_count(q: &Question) -> Option<Intent> {
    if !q.is_count {
        return None;
    }
    q.source.map(|source| Intent::RowCount { source })
}

fn detect_search(q: &Question) -> Option<Intent> {
    Some(Intent::Search { source: q.source })
}

/// Original-case text following the last case-insensitive `" at "`.
fn text_after_last_at(raw: &str) -> Option<&str> {
    let pos = raw
        .as_bytes()
        .windows(4)
        .rposition(|w| w.eq_ignore_ascii_case(b" at "))?;
    Some(&raw[pos + 4..])
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches('"').trim_matches('\'')
}

/// Trim whitespace, surrounding quotes and trailing sentence punctuation
/// from an extracted company name.
fn clean_company(s: &str) -> Option<String> {
    let cleaned = strip_quotes(strip_quotes(s).trim_end_matches(['?', '.', '!']));
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(text: &str) -> Route {
        classify(&Question::new(text)).expect("non-empty question routes")
    }

    fn intent(text: &str) -> Intent {
        route(text).intent
    }

    #[test]
    fn test_blank_question_is_unrouted() {
        assert_eq!(classify(&Question::new("   ")), None);
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "article_themes",
                "article_totals",
                "articles_recent",
                "recent_by_company",
                "multi_company",
                "referral",
                "company",
                "engagement",
                "row_count",
                "search",
            ]
        );
    }

    #[test]
    fn test_themes_win_over_company_phrase() {
        let r = route("Summarize the themes of my articles about connections at Google");
        assert_eq!(r.rule, "article_themes");
        assert_eq!(r.intent, Intent::ArticleThemes);
    }

    #[test]
    fn test_article_totals_and_popularity() {
        assert_eq!(
            intent("How many articles have I written?"),
            Intent::ArticleTotals { popular: false }
        );
        assert_eq!(
            intent("Which of my articles are most popular?"),
            Intent::ArticleTotals { popular: true }
        );
        assert_eq!(
            intent("articles published to date"),
            Intent::ArticleTotals { popular: false }
        );
    }

    #[test]
    fn test_article_days() {
        assert_eq!(
            intent("Which articles did I publish in the last 14 days?"),
            Intent::ArticlesInLastDays { days: 14 }
        );
        assert_eq!(
            intent("Did I post an article last month?"),
            Intent::ArticlesInLastDays { days: 30 }
        );
    }

    #[test]
    fn test_article_days_saturate() {
        assert_eq!(
            intent("Which articles did I publish in the last 99999999999 days?"),
            Intent::ArticlesInLastDays { days: u32::MAX }
        );
    }

    #[test]
    fn test_recent_by_company() {
        assert_eq!(
            intent("Show my most recent connections from Acme Corp"),
            Intent::RecentByCompany {
                company: "Acme Corp".into()
            }
        );
    }

    #[test]
    fn test_multi_company_listing_and_counts() {
        assert_eq!(
            intent("List connections who work at Microsoft or Google"),
            Intent::MultiCompany {
                companies: vec!["Microsoft".into(), "Google".into()],
                op: CompanyOp::Any,
                count: false,
            }
        );
        assert_eq!(
            intent("How many connections have worked at both Stripe and Square?"),
            Intent::MultiCompany {
                companies: vec!["Stripe".into(), "Square".into()],
                op: CompanyOp::All,
                count: true,
            }
        );
        assert_eq!(
            intent("How many connections at either Apple, Meta or Netflix?"),
            Intent::MultiCompany {
                companies: vec!["Apple".into(), "Meta".into(), "Netflix".into()],
                op: CompanyOp::Any,
                count: true,
            }
        );
    }

    #[test]
    fn test_referral() {
        assert_eq!(
            intent("Who can refer me to Stripe roles?"),
            Intent::Referral {
                company: "Stripe".into()
            }
        );
        assert_eq!(
            intent("Who could refer me for a job at Acme"),
            Intent::Referral {
                company: "Acme".into()
            }
        );
    }

    #[test]
    fn test_single_company_phrase_and_fallback() {
        assert_eq!(
            intent("Which connections work at Contoso?"),
            Intent::Company {
                company: "Contoso".into(),
                count: false
            }
        );
        assert_eq!(
            intent("How many connections do I have at Microsoft?"),
            Intent::Company {
                company: "Microsoft".into(),
                count: true
            }
        );
        assert_eq!(
            intent("my connections AT \"Big Co\"."),
            Intent::Company {
                company: "Big Co".into(),
                count: false
            }
        );
    }

    #[test]
    fn test_engagement() {
        assert_eq!(
            intent("Who do I interact with the most?"),
            Intent::Engagement
        );
    }

    #[test]
    fn test_row_count_and_search() {
        assert_eq!(
            intent("How many positions have I held?"),
            Intent::RowCount {
                source: "Positions.csv"
            }
        );
        assert_eq!(
            intent("kubernetes courses"),
            Intent::Search {
                source: Some("Learning.csv")
            }
        );
        assert_eq!(intent("rust"), Intent::Search { source: None });
    }

    #[test]
    fn test_count_question_uses_word_boundaries() {
        assert!(is_count_question("What is the TOTAL?"));
        assert!(is_count_question("number of events"));
        assert!(!is_count_question("my account settings"));
    }
}
