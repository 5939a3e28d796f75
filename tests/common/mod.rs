#![allow(dead_code)]

use chrono::{Duration, Local};
use export_qa::config::Config;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// `Connected On` value for a date `days` before today.
pub fn days_ago(days: i64) -> String {
    (Local::now() - Duration::days(days))
        .format("%d %b %Y")
        .to_string()
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small export: five connections, two positions, two articles and a
/// plain-text note.
pub fn write_export(root: &Path) {
    let connections = format!(
        "Notes:\n\
         \"When exporting your connection data, you may notice that some of the email addresses are missing.\"\n\
         \n\
         First Name,Last Name,URL,Email Address,Company,Position,Connected On\n\
         Ada,Lovelace,https://example.com/ada,,Microsoft,Engineer,{}\n\
         Grace,Hopper,https://example.com/grace,,Microsoft,Rear Admiral,{}\n\
         Alan,Turing,https://example.com/alan,,Google,Researcher,{}\n\
         Linus,Torvalds,https://example.com/linus,,Acme Corp,Maintainer,{}\n\
         Wile,Coyote,https://example.com/wile,,Road Runner Inc,Acme and Umbrella reseller,\n\
         ,,,,,,\n",
        days_ago(5),
        days_ago(10),
        days_ago(20),
        days_ago(400),
    );
    write(root, "Connections.csv", &connections);

    write(
        root,
        "Positions.csv",
        "Company Name,Title,Description,Location,Started On,Finished On\n\
         Acme,Engineer,\"Built   things,\n  fast\",Berlin,Jan 2020,Feb 2022\n\
         Globex,Lead,,Remote,Mar 2022,\n",
    );

    let created = (Local::now() - Duration::days(3)).format("%Y-%m-%d");
    write(
        root,
        "Articles/Articles/2024-01-01 10:00:00.0-agents.html",
        &format!(
            "<html><head><title>Agents</title><style>p {{ color: red; }}</style></head>\
             <body><p>Created on {} 09:00</p>\
             <p>Building agentic workflows with careful orchestration.</p>\
             <script>var hidden = 'kubernetes';</script></body></html>",
            created
        ),
    );
    write(
        root,
        "Articles/Articles/old-post.html",
        "<html><body><h1>Old post</h1><p>Moving our cloud platform to a new region.</p></body></html>",
    );

    write(root, "notes.txt", "Reminder:   learn   Kubernetes\n\nand Rust.\n");
    write(root, ".hidden.csv", "a,b\n1,2\n");
}

/// Temp dir with an export under `export/` and a config whose store lives
/// under `store/`.
pub fn setup() -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let export = tmp.path().join("export");
    write_export(&export);
    let config = Config::new(tmp.path().join("store").join("linkedin.sqlite"), export);
    (tmp, config)
}
