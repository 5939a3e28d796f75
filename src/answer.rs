//! Answer composition.
//!
//! [`answer_question`] classifies a question with the [`router`](crate::router)
//! and runs the strategy for the winning intent against the store, shaping
//! the result into an [`Answer`].

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::articles;
use crate::config::Config;
use crate::connections;
use crate::models::Answer;
use crate::router::{classify, CompanyOp, Intent, Question};
use crate::search::search_documents;
use crate::store::{SqliteStore, Store};
use crate::themes::article_themes;

const ARTICLES_SOURCE: &str = "Articles";

/// Answer a free-text question against the store at `config.store.path`.
pub async fn answer_question(config: &Config, question: &str) -> Result<Answer> {
    let question = Question::new(question);
    if question.raw.is_empty() {
        return Ok(Answer::text("Ask a question to get started."));
    }
    if !config.store.path.exists() {
        return Ok(Answer::text(
            "No indexed export found. Upload an export or rebuild the index first.",
        ));
    }

    let store = SqliteStore::open(&config.store.path).await?;
    let answer = answer_with(&store, config, &question, Local::now().naive_local()).await;
    store.close().await;
    answer
}

/// Route `question` and run its strategy against `store`, treating `now`
/// as the current time.
pub async fn answer_with(
    store: &dyn Store,
    config: &Config,
    question: &Question,
    now: NaiveDateTime,
) -> Result<Answer> {
    let Some(route) = classify(question) else {
        return Ok(Answer::text("Ask a question to get started."));
    };
    debug!(rule = route.rule, intent = ?route.intent, "question routed");

    let mut answer = run_intent(store, config, question, route.intent, now).await?;
    answer.intent = Some(route.rule);
    Ok(answer)
}

async fn run_intent(
    store: &dyn Store,
    config: &Config,
    question: &Question,
    intent: Intent,
    now: NaiveDateTime,
) -> Result<Answer> {
    let limits = &config.limits;
    let prefix = config.sources.articles_prefix.as_str();
    let connections_file = config.sources.connections.as_str();

    let answer = match intent {
        Intent::ArticleThemes => {
            let themes = article_themes(store, prefix, limits.themes).await?;
            let answer = if themes.is_empty() {
                Answer::text("I couldn't find any articles to summarize.")
            } else {
                Answer::text("Top conceptual themes across your articles.")
                    .with_matches(themes.into_iter().map(|t| t.example).collect())
            };
            answer.with_source(ARTICLES_SOURCE)
        }

        Intent::ArticleTotals { popular } => {
            let count = articles::count_all(store, prefix).await?;
            let mut text = format!("You have published {} articles so far.", count);
            let mut matches = Vec::new();
            if popular {
                matches = articles::most_popular(store, prefix, limits.popular_articles).await?;
                if matches.is_empty() {
                    text.push_str(
                        " I couldn't estimate popularity because article lengths were missing.",
                    );
                } else {
                    text.push_str(
                        " The export does not include views/likes, so popularity is \
                         approximated by longer articles.",
                    );
                }
            }
            Answer::text(text)
                .with_matches(matches)
                .with_source(ARTICLES_SOURCE)
        }

        Intent::ArticlesInLastDays { days } => {
            let dated =
                articles::articles_in_last_days(store, prefix, days, limits.dated_articles, now)
                    .await?;
            let mut text = format!(
                "You published {} articles in the last {} days.",
                dated.count, days
            );
            if dated.missing > 0 {
                text.push_str(&format!(
                    " ({} article(s) missing a created date were skipped.)",
                    dated.missing
                ));
            }
            let mut answer = Answer::text(text)
                .with_matches(dated.matches)
                .with_source(ARTICLES_SOURCE);
            answer.days = Some(days);
            answer
        }

        Intent::RecentByCompany { company } => {
            let matches = connections::recent_connections_at(
                store,
                connections_file,
                &company,
                limits.recent_company,
            )
            .await?;
            let text = if matches.is_empty() {
                format!("No recent connections found for {}.", company)
            } else {
                format!(
                    "Here are your most recently added connections at {}.",
                    company
                )
            };
            Answer::text(text)
                .with_matches(matches)
                .with_source(connections_file)
                .with_company(company)
        }

        Intent::MultiCompany {
            companies,
            op,
            count,
        } => {
            let joined = companies.join(", ");
            let answer = if count {
                match op {
                    CompanyOp::All => {
                        let n = connections::count_at_all(store, connections_file, &companies).await?;
                        Answer::text(format!(
                            "You have {} connections whose current company matches all of: {}. \
                             LinkedIn exports only include current company, not full work \
                             history for connections.",
                            n, joined
                        ))
                    }
                    CompanyOp::Any => {
                        let mut parts = Vec::with_capacity(companies.len());
                        for company in &companies {
                            let n = connections::count_at(store, connections_file, company).await?;
                            parts.push(format!("{}: {}", company, n));
                        }
                        Answer::text(format!(
                            "Counts by company (current company only): {}.",
                            parts.join("; ")
                        ))
                    }
                }
            } else {
                let matches = connections::connections_at_any(
                    store,
                    connections_file,
                    &companies,
                    limits.multi_company,
                )
                .await?;
                let text = if matches.is_empty() {
                    format!("No connections found for {}.", joined)
                } else {
                    format!(
                        "Here are connections whose current company matches any of: {}.",
                        joined
                    )
                };
                Answer::text(text).with_matches(matches)
            };
            let mut answer = answer.with_source(connections_file);
            answer.companies = Some(companies);
            answer
        }

        Intent::Referral { company } => {
            let matches =
                connections::connections_at(store, connections_file, &company, limits.company).await?;
            let text = if matches.is_empty() {
                format!("No connections found for {}.", company)
            } else {
                format!("Here are connections who could refer you at {}.", company)
            };
            Answer::text(text)
                .with_matches(matches)
                .with_source(connections_file)
                .with_company(company)
        }

        Intent::Company { company, count } => {
            let answer = if count {
                let n = connections::count_at(store, connections_file, &company).await?;
                Answer::text(format!("You have {} connections at {}.", n, company))
            } else {
                let matches =
                    connections::connections_at(store, connections_file, &company, limits.company)
                        .await?;
                let text = if matches.is_empty() {
                    format!("No connections found for {}.", company)
                } else {
                    format!("Here are your connections who work at {}.", company)
                };
                Answer::text(text).with_matches(matches)
            };
            answer.with_source(connections_file).with_company(company)
        }

        Intent::Engagement => {
            let matches = connections::recent_connections(store, connections_file, limits.recent).await?;
            Answer::text(
                "Your LinkedIn export does not include interaction counts, so I can't \
                 measure engagement directly. Here are your most recently added connections \
                 as a nearby proxy.",
            )
            .with_matches(matches)
            .with_source(connections_file)
        }

        Intent::RowCount { source } => {
            let text = match store.source_row_count(source).await? {
                Some(n) => format!("There are {} rows in {}.", n, source),
                None => format!("I couldn't find any rows for {}.", source),
            };
            Answer::text(text).with_source(source)
        }

        Intent::Search { source } => {
            let matches = search_documents(store, &question.raw, source, limits.search).await?;
            let text = if matches.is_empty() {
                "No direct matches found. Try different keywords or a broader query."
            } else {
                "Here are the closest matches from your LinkedIn export."
            };
            let answer = Answer::text(text).with_matches(matches);
            match source {
                Some(source) => answer.with_source(source),
                None => answer,
            }
        }
    };
    Ok(answer)
}
