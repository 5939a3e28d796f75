//! Core data models used throughout the export pipeline.
//!
//! These types represent the documents produced by normalization, the rows
//! read back from the store, and the answers returned to callers.

use serde::Serialize;

/// Ordered `column -> value` mapping of one document.
///
/// Insertion order is the source column order; inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, or `""` when absent.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    /// Parse stored field JSON. Anything that is not a JSON object yields an
    /// empty mapping; `null` values become `""` and other scalars their JSON
    /// text.
    pub fn from_json(raw: &str) -> Self {
        let mut fields = Fields::new();
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(raw) {
            for (k, v) in map {
                let value = match v {
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                fields.insert(k, value);
            }
        }
        fields
    }
}

/// A normalized document produced from one CSV row or one whole file,
/// before it receives a store identifier.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub source_file: String,
    pub row_id: i64,
    pub title: String,
    pub body: String,
    pub fields: Fields,
}

/// A document read back from the store.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: i64,
    pub source_file: String,
    pub row_id: i64,
    pub title: String,
    pub body: String,
    pub fields: Fields,
}

/// One ingested file with its aggregate metadata.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceSummary {
    pub source_file: String,
    pub row_count: i64,
    pub columns: Vec<String>,
}

/// A single hit inside an [`Answer`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Match {
    pub source_file: String,
    pub row_id: i64,
    pub title: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_company: Option<String>,
}

impl Match {
    pub fn new(
        source_file: impl Into<String>,
        row_id: i64,
        title: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            row_id,
            title: title.into(),
            snippet: snippet.into(),
            connected_on: None,
            matched_company: None,
        }
    }
}

/// Structured answer to a free-text question.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Answer {
    pub answer: String,
    pub matches: Vec<Match>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    /// Name of the routing rule that produced this answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<&'static str>,
}

impl Answer {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            ..Default::default()
        }
    }

    pub fn with_matches(mut self, matches: Vec<Match>) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}
