//! Keyword-based concept themes across articles.

use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Match, StoredDocument};
use crate::store::Store;

/// A named concept and the whole-word patterns that signal it.
pub struct Concept {
    pub name: &'static str,
    pub patterns: Vec<Regex>,
}

const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "AI agents & autonomy",
        &[
            r"\bagentic\b",
            r"\bagents?\b",
            r"\bautonom(?:ous|y)\b",
            r"\borchestration\b",
            r"\bworkflow\b",
        ],
    ),
    (
        "Evaluation & reliability",
        &[
            r"\bevals?\b",
            r"\bevaluation\b",
            r"\bbenchmark\b",
            r"\breliab(?:ility|le)\b",
            r"\btesting\b",
        ],
    ),
    (
        "Observability & monitoring",
        &[
            r"\bobservability\b",
            r"\bmonitoring\b",
            r"\btelemetry\b",
            r"\btrace\b",
        ],
    ),
    (
        "Retrieval, RAG & context",
        &[r"\brag\b", r"\bretrieval\b", r"\bcontext\b", r"\bknowledge\b"],
    ),
    (
        "Security, safety & guardrails",
        &[
            r"\bsecurity\b",
            r"\bsafety\b",
            r"\bguardrails?\b",
            r"\bcompliance\b",
            r"\brisk\b",
        ],
    ),
    (
        "Product strategy & GTM",
        &[
            r"\bproduct\b",
            r"\bpricing\b",
            r"\bgo[- ]to[- ]market\b",
            r"\bpositioning\b",
            r"\bstrategy\b",
        ],
    ),
    (
        "Leadership & org design",
        &[
            r"\bleadership\b",
            r"\borganization\b",
            r"\bteam\b",
            r"\bmanagement\b",
            r"\bculture\b",
        ],
    ),
    (
        "Careers & skills",
        &[
            r"\bcareer\b",
            r"\bjobs?\b",
            r"\bskills?\b",
            r"\bhiring\b",
            r"\btalent\b",
        ],
    ),
    (
        "Infrastructure & platforms",
        &[
            r"\bplatform\b",
            r"\bhosting\b",
            r"\binfrastructure\b",
            r"\bdeployment\b",
            r"\bcloud\b",
        ],
    ),
];

/// The compiled concept taxonomy, in ranking tie-break order.
pub static CONCEPTS: LazyLock<Vec<Concept>> = LazyLock::new(|| {
    TAXONOMY
        .iter()
        .map(|(name, patterns)| Concept {
            name: *name,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
                .collect(),
        })
        .collect()
});

impl Concept {
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

/// One ranked concept with the first article that hit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeHit {
    pub concept: &'static str,
    pub count: usize,
    pub example: Match,
}

pub async fn article_themes(store: &dyn Store, prefix: &str, top_n: usize) -> Result<Vec<ThemeHit>> {
    let docs = store.documents_with_prefix(prefix).await?;
    Ok(rank_themes(&docs, top_n))
}

/// Rank concepts by how many articles hit them. Ties keep taxonomy order;
/// concepts with no hits are dropped.
pub fn rank_themes(docs: &[StoredDocument], top_n: usize) -> Vec<ThemeHit> {
    let mut tallies: Vec<(usize, Option<&StoredDocument>)> = vec![(0, None); CONCEPTS.len()];

    for doc in docs {
        let text = format!("{}\n{}", doc.title, doc.body).to_lowercase();
        for (concept, tally) in CONCEPTS.iter().zip(tallies.iter_mut()) {
            if concept.matches(&text) {
                tally.0 += 1;
                tally.1.get_or_insert(doc);
            }
        }
    }

    let mut ranked: Vec<(&Concept, usize, &StoredDocument)> = CONCEPTS
        .iter()
        .zip(tallies)
        .filter_map(|(concept, (count, example))| Some((concept, count, example?)))
        .filter(|(_, count, _)| *count > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(concept, count, doc)| ThemeHit {
            concept: concept.name,
            count,
            example: Match::new(
                doc.source_file.clone(),
                doc.row_id,
                doc.title.clone(),
                format!("Theme: {} (articles: {})", concept.name, count),
            ),
        })
        .collect()
}
