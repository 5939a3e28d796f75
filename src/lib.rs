//! # Export Q&A
//!
//! Indexes a personal data export (CSV tables, HTML pages, plain text) into
//! a SQLite full-text store and answers free-text questions about it by
//! routing each question to a specialized strategy.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────────┐
//! │ Scanner  │──▶│ Normalizer │──▶│ SQLite store │
//! │ + sig    │   │ CSV/HTML   │   │ FTS5+manifest│
//! └──────────┘   └────────────┘   └──────┬───────┘
//!                                        │
//!            ┌──────────┐   ┌────────────┤
//!  question ▶│  Router  │──▶│ Strategies │──▶ Answer
//!            └──────────┘   └────────────┘
//! ```
//!
//! ## Entry points
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`manifest::ensure_index`] | Rebuild the store when missing or stale |
//! | [`answer::answer_question`] | Answer a free-text question |
//! | [`stats::collect_stats`] | Connection statistics |
//! | [`sources::row_count`] | Row count of a named source |
//! | [`sources::list_sources`] | Every ingested source |
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and limits |
//! | [`session`] | Per-session store and export paths |
//! | [`error`] | Typed errors surfaced to callers |
//! | [`models`] | Core data types |
//! | [`scanner`] | Export enumeration and signature |
//! | [`normalize`] | File → documents |
//! | [`db`] | SQLite connections |
//! | [`schema`] | Store schema |
//! | [`ingest`] | Transactional rebuild |
//! | [`store`] | Read-side storage trait |
//! | [`manifest`] | Staleness detection |
//! | [`router`] | Ordered question classification |
//! | [`connections`] | Company and recency lookups |
//! | [`articles`] | Article totals, windows and popularity |
//! | [`themes`] | Concept themes across articles |
//! | [`search`] | Generic keyword search |
//! | [`answer`] | Strategy dispatch and answer shaping |

pub mod answer;
pub mod articles;
pub mod config;
pub mod connections;
pub mod db;
pub mod error;
pub mod ingest;
pub mod manifest;
pub mod models;
pub mod normalize;
pub mod router;
pub mod scanner;
pub mod schema;
pub mod search;
pub mod session;
pub mod sources;
pub mod stats;
pub mod store;
pub mod themes;
