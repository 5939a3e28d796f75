mod common;

use export_qa::answer::answer_question;
use export_qa::config::Config;
use export_qa::connections::{connections_at, count_at};
use export_qa::manifest::ensure_index;
use export_qa::stats::collect_stats;
use export_qa::store::SqliteStore;

async fn indexed() -> (tempfile::TempDir, Config) {
    let (tmp, config) = common::setup();
    ensure_index(&config, false).await.unwrap();
    (tmp, config)
}

fn titles(matches: &[export_qa::models::Match]) -> Vec<&str> {
    matches.iter().map(|m| m.title.as_str()).collect()
}

#[tokio::test]
async fn test_company_count_question() {
    let (_tmp, config) = indexed().await;
    let answer = answer_question(&config, "How many connections do I have at Microsoft?")
        .await
        .unwrap();
    assert_eq!(answer.answer, "You have 2 connections at Microsoft.");
    assert!(answer.matches.is_empty());
    assert_eq!(answer.company.as_deref(), Some("Microsoft"));
    assert_eq!(answer.source.as_deref(), Some("Connections.csv"));
    assert_eq!(answer.intent, Some("company"));
}

#[tokio::test]
async fn test_company_listing() {
    let (_tmp, config) = indexed().await;
    let answer = answer_question(&config, "Which connections work at Google?")
        .await
        .unwrap();
    assert_eq!(answer.answer, "Here are your connections who work at Google.");
    assert_eq!(titles(&answer.matches), vec!["Alan Turing"]);
    assert_eq!(
        answer.matches[0].snippet,
        format!(
            "Position: Researcher\nCompany: Google\nConnected On: {}\nURL: https://example.com/alan",
            common::days_ago(20)
        )
    );

    let none = answer_question(&config, "Which connections work at Hooli?")
        .await
        .unwrap();
    assert_eq!(none.answer, "No connections found for Hooli.");
}

#[tokio::test]
async fn test_multi_company_listing_is_annotated() {
    let (_tmp, config) = indexed().await;
    let answer = answer_question(&config, "List connections who work at Microsoft or Google")
        .await
        .unwrap();
    assert_eq!(
        answer.answer,
        "Here are connections whose current company matches any of: Microsoft, Google."
    );
    assert_eq!(
        answer.companies,
        Some(vec!["Microsoft".to_string(), "Google".to_string()])
    );
    assert_eq!(
        titles(&answer.matches),
        vec!["Ada Lovelace", "Grace Hopper", "Alan Turing"]
    );
    let companies: Vec<Option<&str>> = answer
        .matches
        .iter()
        .map(|m| m.matched_company.as_deref())
        .collect();
    assert_eq!(
        companies,
        vec![Some("Microsoft"), Some("Microsoft"), Some("Google")]
    );
    assert!(answer.matches[2].snippet.starts_with("Company match: Google\n"));
}

#[tokio::test]
async fn test_multi_company_listing_respects_limit() {
    let (_tmp, mut config) = indexed().await;
    config.limits.multi_company = 2;
    let answer = answer_question(&config, "List connections who work at Microsoft or Google")
        .await
        .unwrap();
    assert_eq!(titles(&answer.matches), vec!["Ada Lovelace", "Grace Hopper"]);
}

#[tokio::test]
async fn test_multi_company_counts() {
    let (_tmp, config) = indexed().await;

    let any = answer_question(&config, "How many connections at Microsoft or Google?")
        .await
        .unwrap();
    assert_eq!(
        any.answer,
        "Counts by company (current company only): Microsoft: 2; Google: 1."
    );
    assert!(any.matches.is_empty());

    let all = answer_question(
        &config,
        "How many connections have worked at both Microsoft and Google?",
    )
    .await
    .unwrap();
    assert!(all
        .answer
        .starts_with("You have 0 connections whose current company matches all of: Microsoft, Google."));
}

#[tokio::test]
async fn test_strict_company_match_before_loose_fallback() {
    let (_tmp, config) = indexed().await;
    let store = SqliteStore::open(&config.store.path).await.unwrap();

    // "Acme" is Linus's company and only a word in Wile's position.
    let strict = connections_at(&store, "Connections.csv", "Acme", 50)
        .await
        .unwrap();
    assert_eq!(titles(&strict), vec!["Linus Torvalds"]);
    assert_eq!(count_at(&store, "Connections.csv", "Acme").await.unwrap(), 1);

    // No row has "Company: Umbrella", so the bare name is searched instead.
    let loose = connections_at(&store, "Connections.csv", "Umbrella", 50)
        .await
        .unwrap();
    assert_eq!(titles(&loose), vec!["Wile Coyote"]);
    assert_eq!(
        count_at(&store, "Connections.csv", "umbrella").await.unwrap(),
        1
    );

    store.close().await;
}

#[tokio::test]
async fn test_recent_connections_at_company() {
    let (_tmp, config) = indexed().await;
    let answer = answer_question(&config, "Who are my most recent connections at microsoft?")
        .await
        .unwrap();
    assert_eq!(
        answer.answer,
        "Here are your most recently added connections at microsoft."
    );
    assert_eq!(titles(&answer.matches), vec!["Ada Lovelace", "Grace Hopper"]);
    assert_eq!(
        answer.matches[0].connected_on.as_deref(),
        Some(common::days_ago(5).as_str())
    );
}

#[tokio::test]
async fn test_referral_and_engagement() {
    let (_tmp, config) = indexed().await;

    let referral = answer_question(&config, "Who can refer me to Google roles?")
        .await
        .unwrap();
    assert_eq!(
        referral.answer,
        "Here are connections who could refer you at Google."
    );
    assert_eq!(titles(&referral.matches), vec!["Alan Turing"]);

    let engagement = answer_question(&config, "Who do I talk to the most?")
        .await
        .unwrap();
    assert!(engagement
        .answer
        .starts_with("Your LinkedIn export does not include interaction counts"));
    assert_eq!(
        titles(&engagement.matches),
        vec!["Ada Lovelace", "Grace Hopper", "Alan Turing", "Linus Torvalds"]
    );
}

#[tokio::test]
async fn test_article_answers() {
    let (_tmp, config) = indexed().await;

    let total = answer_question(&config, "How many articles have I published?")
        .await
        .unwrap();
    assert_eq!(total.answer, "You have published 2 articles so far.");
    assert_eq!(total.source.as_deref(), Some("Articles"));

    let popular = answer_question(&config, "What are my most popular articles?")
        .await
        .unwrap();
    assert!(popular
        .answer
        .ends_with("popularity is approximated by longer articles."));
    assert_eq!(popular.matches.len(), 2);
    assert!(popular.matches[0].snippet.starts_with("Length estimate: "));

    let recent = answer_question(&config, "Which articles did I publish in the last 7 days?")
        .await
        .unwrap();
    assert_eq!(
        recent.answer,
        "You published 1 articles in the last 7 days. (1 article(s) missing a created date were skipped.)"
    );
    assert_eq!(recent.days, Some(7));
    assert_eq!(recent.matches.len(), 1);
    assert!(recent.matches[0].snippet.ends_with(" 09:00"));
}

#[tokio::test]
async fn test_huge_article_window_counts_all_dated() {
    let (_tmp, config) = indexed().await;
    for question in [
        "Which articles did I publish in the last 100000000 days?",
        "Which articles did I publish in the last 99999999999 days?",
    ] {
        let answer = answer_question(&config, question).await.unwrap();
        assert_eq!(answer.intent, Some("articles_recent"));
        assert_eq!(answer.matches.len(), 1);
        assert!(answer.answer.starts_with("You published 1 articles in the last "));
    }
}

#[tokio::test]
async fn test_theme_question_outranks_company_phrase() {
    let (_tmp, config) = indexed().await;
    let answer = answer_question(
        &config,
        "Summarize the themes in my articles about connections at Google",
    )
    .await
    .unwrap();
    assert_eq!(answer.intent, Some("article_themes"));
    assert_eq!(answer.answer, "Top conceptual themes across your articles.");
    let snippets: Vec<&str> = answer.matches.iter().map(|m| m.snippet.as_str()).collect();
    assert_eq!(
        snippets,
        vec![
            "Theme: AI agents & autonomy (articles: 1)",
            "Theme: Infrastructure & platforms (articles: 1)",
        ]
    );
}

#[tokio::test]
async fn test_row_count_and_search() {
    let (_tmp, config) = indexed().await;

    let count = answer_question(&config, "How many positions are listed?")
        .await
        .unwrap();
    assert_eq!(count.answer, "There are 2 rows in Positions.csv.");

    let missing = answer_question(&config, "How many courses did I take?")
        .await
        .unwrap();
    assert_eq!(missing.answer, "I couldn't find any rows for Learning.csv.");

    let search = answer_question(&config, "kubernetes").await.unwrap();
    assert_eq!(
        search.answer,
        "Here are the closest matches from your LinkedIn export."
    );
    let sources: Vec<&str> = search
        .matches
        .iter()
        .map(|m| m.source_file.as_str())
        .collect();
    assert_eq!(sources, vec!["notes.txt"]);
    assert!(search.matches[0].snippet.contains("[Kubernetes]"));

    let nothing = answer_question(&config, "?!").await.unwrap();
    assert_eq!(
        nothing.answer,
        "No direct matches found. Try different keywords or a broader query."
    );
}

#[tokio::test]
async fn test_empty_question_and_missing_store() {
    let (tmp, config) = common::setup();

    let blank = answer_question(&config, "   ").await.unwrap();
    assert_eq!(blank.answer, "Ask a question to get started.");

    let unbuilt = answer_question(&config, "How many connections at Microsoft?")
        .await
        .unwrap();
    assert_eq!(
        unbuilt.answer,
        "No indexed export found. Upload an export or rebuild the index first."
    );

    let stats = collect_stats(&Config::new(
        tmp.path().join("nowhere.sqlite"),
        tmp.path().join("export"),
    ))
    .await
    .unwrap();
    assert!(stats.top_companies.is_empty());
}

#[tokio::test]
async fn test_connection_stats() {
    let (_tmp, config) = indexed().await;
    let stats = collect_stats(&config).await.unwrap();

    assert_eq!(stats.recent_counts["30d"], 3);
    assert_eq!(stats.recent_counts["90d"], 3);
    assert_eq!(stats.recent_counts["365d"], 3);

    assert_eq!(stats.top_companies[0].name, "Microsoft");
    assert_eq!(stats.top_companies[0].count, 2);
    assert_eq!(stats.top_companies.len(), 4);
    assert!(stats.top_industries.is_empty());

    let total: usize = stats.connections_by_month.iter().map(|m| m.count).sum();
    assert_eq!(total, 4);
    let months: Vec<&str> = stats
        .connections_by_month
        .iter()
        .map(|m| m.month.as_str())
        .collect();
    let mut sorted = months.clone();
    sorted.sort();
    assert_eq!(months, sorted);
}
