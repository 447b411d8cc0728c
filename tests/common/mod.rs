// Shared test helpers for gfm-fixtures.
//
// `MockGists` stands in for GitHub: it records every call, "renders" a few
// known inputs the way GitHub does (decoration included), and serves a page
// with file renderings in reverse slot order.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use gfm_fixtures::service::{CreatedContainer, CreatedEntry, Entry, RenderService};
use gfm_fixtures::FixtureError;

pub const GIST_ID: &str = "aa5a315d61ae9438b18d";
pub const GIST_URL: &str = "https://gist.github.com/aa5a315d61ae9438b18d";

/// A call made against the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(Vec<String>),
    Comment(String),
    Fetch(String),
    Delete(String),
}

#[derive(Default)]
pub struct MockGists {
    entries: Mutex<Vec<Entry>>,
    comments: Mutex<Vec<String>>,
    calls: Mutex<Vec<Call>>,
    content_type: Option<String>,
    fail_fetch: bool,
}

impl MockGists {
    pub fn new() -> Self {
        Self {
            content_type: Some("text/markdown".to_string()),
            ..Default::default()
        }
    }

    /// Report `content_type` for every created entry.
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Make `fetch` fail with a server error.
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Contents of the entries the container was created with.
    pub fn submitted(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        entries.iter().map(|entry| entry.content.clone()).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn page(&self) -> String {
        let entries = self.entries.lock().unwrap();
        let comments = self.comments.lock().unwrap();
        let mut body = String::new();
        for entry in entries.iter().rev() {
            body.push_str(&format!(
                concat!(
                    r#"<div id="file-{id}" class="file my-2">"#,
                    r#"<div class="file-header d-flex flex-md-items-center flex-items-start">"#,
                    r##"<div class="file-info pr-4 d-flex flex-md-items-center flex-items-start flex-order-1 flex-auto"><a href="#file-{id}" class="wb-break-all">"##,
                    r#"<strong class="user-select-contain gist-blob-name css-truncate-target">{name}</strong></a></div></div>"#,
                    r#"<div id="file-{id}-readme" class="Box-body readme blob p-5 p-xl-6 gist-border-0">"#,
                    r#"<article class="markdown-body entry-content container-lg" itemprop="text">{html}</article>"#,
                    "</div></div>\n",
                ),
                id = entry.name.replace('.', "-"),
                name = entry.name,
                html = render(&entry.content, false),
            ));
        }
        for comment in comments.iter() {
            body.push_str(&format!(
                concat!(
                    r#"<div class="timeline-comment-group"><div class="timeline-comment">"#,
                    r#"<div class="comment-body markdown-body js-comment-body soft-wrap user-select-contain d-block">"#,
                    "\n{html}\n",
                    "</div></div></div>\n",
                ),
                html = render(comment, true),
            ));
        }
        body.push_str(concat!(
            r#"<form class="js-new-comment-form"><div class="comment-body markdown-body js-preview-body">"#,
            "<p>Nothing to preview</p></div></form>",
        ));
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>gist</title></head>\n<body>\n{body}\n</body></html>\n"
        )
    }
}

/// GitHub-style rendering for the inputs the tests use.
pub fn render(markdown: &str, comment: bool) -> String {
    match markdown {
        "a\nb" if comment => r#"<p dir="auto">a<br>\nb</p>"#.replace("\\n", "\n"),
        "a\nb" => "<p dir=\"auto\">a\nb</p>".to_string(),
        "# hi" => heading("h1", "hi"),
        "* [x] a" => concat!(
            r#"<ul class="contains-task-list">"#,
            "\n",
            r#"<li class="task-list-item"><input type="checkbox" id="" disabled="" class="task-list-item-checkbox" checked=""> a</li>"#,
            "\n</ul>",
        )
        .to_string(),
        "---\na: \"b\"\n---\n# c" => format!(
            concat!(
                r#"<table data-table-type="yaml-metadata">"#,
                "\n  <thead>\n  <tr>\n  <th>a</th>\n  </tr>\n  </thead>\n",
                "  <tbody>\n  <tr>\n  <td><div>b</div></td>\n  </tr>\n  </tbody>\n</table>\n\n{heading}",
            ),
            heading = heading("h1", "c"),
        ),
        "![a](https://example.com/a.png)" => concat!(
            r#"<p dir="auto"><a target="_blank" rel="noopener noreferrer nofollow" href="https://camo.githubusercontent.com/0f1e"><img src="https://camo.githubusercontent.com/0f1e" alt="a" data-canonical-src="https://example.com/a.png" style="max-width: 100%;"></a></p>"#,
        )
        .to_string(),
        "@wooorm" => concat!(
            r#"<p dir="auto"><a class="user-mention notranslate" data-hovercard-type="user" data-hovercard-url="/users/wooorm/hovercard" data-octo-click="hovercard-link-click" data-octo-dimensions="link_type:self" href="https://github.com/wooorm">@wooorm</a></p>"#,
        )
        .to_string(),
        other => format!("<p dir=\"auto\">{}</p>", other.replace('&', "&amp;").replace('<', "&lt;")),
    }
}

fn heading(tag: &str, text: &str) -> String {
    format!(
        concat!(
            r#"<div class="markdown-heading" dir="auto"><{tag} class="heading-element" dir="auto">{text}</{tag}>"#,
            r##"<a id="user-content-{text}" class="anchor" aria-label="Permalink: {text}" href="#{text}">"##,
            r#"<svg class="octicon octicon-link" viewBox="0 0 16 16" version="1.1" width="16" height="16" aria-hidden="true"><path d="m7.775 3.275 1.25-1.25"></path></svg></a></div>"#,
        ),
        tag = tag,
        text = text,
    )
}

#[async_trait]
impl RenderService for MockGists {
    async fn create_container(&self, entries: &[Entry]) -> Result<CreatedContainer, FixtureError> {
        self.record(Call::Create(entries.iter().map(|e| e.name.clone()).collect()));
        *self.entries.lock().unwrap() = entries.to_vec();
        Ok(CreatedContainer {
            id: Some(GIST_ID.to_string()),
            public_url: Some(GIST_URL.to_string()),
            entries: Some(
                entries
                    .iter()
                    .map(|entry| CreatedEntry {
                        name: entry.name.clone(),
                        content_type: self.content_type.clone(),
                        truncated: Some(false),
                    })
                    .collect(),
            ),
        })
    }

    async fn post_comment(&self, id: &str, body: &str) -> Result<(), FixtureError> {
        assert_eq!(id, GIST_ID);
        self.record(Call::Comment(body.to_string()));
        self.comments.lock().unwrap().push(body.to_string());
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<String, FixtureError> {
        self.record(Call::Fetch(url.to_string()));
        if self.fail_fetch {
            return Err(FixtureError::Server {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(self.page())
    }

    async fn delete_container(&self, id: &str) -> Result<(), FixtureError> {
        self.record(Call::Delete(id.to_string()));
        Ok(())
    }
}

/// Write a markdown source below `root`, creating parent directories.
pub fn write_source(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Read a generated output, if it exists.
pub fn read_output(root: &Path, relative: &str) -> Option<String> {
    fs::read_to_string(root.join(relative)).ok()
}
