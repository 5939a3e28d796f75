//! Document normalizer.
//!
//! Turns one export file into zero or more [`NewDocument`]s:
//!
//! - CSV: one document per non-blank data row. The header is the first line
//!   containing a comma, skipping blank lines and any `Notes:` preamble
//!   (which runs until the next blank line).
//! - HTML/HTM: one document holding the visible text.
//! - TXT, and CSV files without a discoverable header: one document holding
//!   the cleaned file content.
//!
//! Files without extractable text produce nothing. Read failures are logged
//! and treated the same way.

use scraper::{ElementRef, Html, Node};
use std::path::Path;
use tracing::{debug, warn};

use crate::models::{Fields, NewDocument};
use crate::scanner::ExportFile;

/// Title candidates in priority order, after the joined first/last name.
const TITLE_FIELDS: &[&str] = &[
    "Content Title",
    "Title",
    "Job Title",
    "Company Name",
    "Company",
    "Organization",
    "School Name",
    "First Name",
    "Last Name",
    "Headline",
];

/// Elements whose text is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Normalize one scanned file.
pub fn normalize_file(file: &ExportFile) -> Vec<NewDocument> {
    match file.extension().as_str() {
        "csv" => csv_documents(&file.path, &file.relative),
        "html" | "htm" | "txt" => whole_file_document(&file.path, &file.relative)
            .into_iter()
            .collect(),
        other => {
            debug!(file = %file.relative, extension = other, "no normalizer for file");
            Vec::new()
        }
    }
}

/// Collapse every whitespace run to one space and trim.
pub fn clean_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn read_source(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            Some(match text.strip_prefix('\u{feff}') {
                Some(stripped) => stripped.to_string(),
                None => text,
            })
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable export file");
            None
        }
    }
}

fn whole_file_document(path: &Path, relative: &str) -> Option<NewDocument> {
    let raw = read_source(path)?;
    let is_html = matches!(
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref(),
        Some("html") | Some("htm")
    );
    let text = if is_html {
        html_visible_text(&raw)
    } else {
        clean_text(&raw)
    };
    text_document(path, relative, text)
}

fn text_document(path: &Path, relative: &str, text: String) -> Option<NewDocument> {
    if text.is_empty() {
        return None;
    }
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut fields = Fields::new();
    fields.insert("text", text.clone());
    Some(NewDocument {
        source_file: relative.to_string(),
        row_id: 1,
        title: title_from_filename(&filename),
        body: text,
        fields,
    })
}

/// Visible text of an HTML page, whitespace-collapsed.
pub fn html_visible_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let mut parts = Vec::new();
    collect_text(document.root_element(), &mut parts);
    clean_text(&parts.join(" "))
}

fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// `Some_file-name.html` becomes `Some File Name`.
pub fn title_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let spaced: String = stem
        .split(|c| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    title_case(spaced.trim())
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Split off the header line. Returns the header and the text after it, or
/// `None` when no header is found.
fn locate_header(content: &str) -> Option<(&str, &str)> {
    let mut notes_mode = false;
    let mut offset = 0;
    while offset < content.len() {
        let rest = &content[offset..];
        let line_len = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        let line = &rest[..line_len];
        offset += line_len;

        let stripped = line.trim();
        if stripped.is_empty() {
            notes_mode = false;
            continue;
        }
        if stripped.to_lowercase().starts_with("notes:") {
            notes_mode = true;
            continue;
        }
        if notes_mode {
            continue;
        }
        if stripped.contains(',') {
            return Some((stripped, &content[offset..]));
        }
    }
    None
}

fn parse_header(line: &str) -> Option<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let record = reader.records().next()?.ok()?;
    Some(record.iter().map(|h| h.to_string()).collect())
}

fn csv_documents(path: &Path, relative: &str) -> Vec<NewDocument> {
    let Some(content) = read_source(path) else {
        return Vec::new();
    };

    let Some((header_line, rest)) = locate_header(&content) else {
        debug!(file = %relative, "no CSV header found, indexing as text");
        return text_document(path, relative, clean_text(&content))
            .into_iter()
            .collect();
    };
    let Some(headers) = parse_header(header_line) else {
        return text_document(path, relative, clean_text(&content))
            .into_iter()
            .collect();
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(rest.as_bytes());

    let mut docs = Vec::new();
    let mut row_id = 0i64;
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(file = %relative, error = %e, "stopping at malformed CSV record");
                break;
            }
        };
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        row_id += 1;
        let mut fields = Fields::new();
        for (i, header) in headers.iter().enumerate() {
            fields.insert(header.clone(), clean_text(record.get(i).unwrap_or("")));
        }
        docs.push(NewDocument {
            source_file: relative.to_string(),
            row_id,
            title: infer_title(&fields, relative, row_id),
            body: row_body(&fields),
            fields,
        });
    }
    docs
}

fn row_body(fields: &Fields) -> String {
    fields
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn infer_title(fields: &Fields, source: &str, row_id: i64) -> String {
    let first = fields.text("First Name");
    let last = fields.text("Last Name");
    if !first.is_empty() && !last.is_empty() {
        return format!("{} {}", first, last).trim().to_string();
    }
    TITLE_FIELDS
        .iter()
        .map(|f| fields.text(f))
        .find(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| format!("{} row {}", source, row_id))
}
