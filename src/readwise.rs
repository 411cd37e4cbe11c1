use chrono::{Local, TimeZone};
use colored::Colorize;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Result, SyncError};

/// A tag as the Reader API serves it: sometimes a bare string, sometimes an
/// object carrying a `name` field. Both normalize to the plain name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    Plain(String),
    Object { name: String },
}

impl Tag {
    pub fn name(&self) -> &str {
        match self {
            Tag::Plain(name) => name,
            Tag::Object { name } => name,
        }
    }
}

/// One archived document from the Reader list endpoint. Read-only: this tool
/// counts documents, it never writes them back.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub source_url: Option<String>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Document {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(Tag::name).collect()
    }

    /// Case-sensitive exact membership test against normalized tag names.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.name() == tag)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

#[derive(Debug, Deserialize)]
struct DocumentPage {
    #[serde(default)]
    results: Vec<Document>,

    #[serde(default, rename = "nextPageCursor")]
    next_page_cursor: Option<String>,
}

pub struct ReadwiseClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl ReadwiseClient {
    /// Fails before any network call when `READWISE_TOKEN` is absent.
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.require_readwise_token()?.to_string();
        Ok(Self {
            http: reqwest::blocking::Client::new(),
            base_url: config.readwise_api_base.clone(),
            token,
        })
    }

    /// Fetch every archived document, following the page cursor until the
    /// server stops returning one. `since` is forwarded as an `updatedAfter`
    /// filter; the server matches any update in that window, not just the
    /// move to archive, so the result can over-approximate newly archived
    /// items.
    pub fn list_archived(&self, since: Option<i64>) -> Result<Vec<Document>> {
        let url = format!("{}/list/", self.base_url);
        let updated_after = since.map(naive_local_iso);

        let mut all_items: Vec<Document> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("Token {}", self.token),
                )
                .query(&[("location", "archive")]);

            if let Some(ref after) = updated_after {
                request = request.query(&[("updatedAfter", after.as_str())]);
            }
            if let Some(ref c) = cursor {
                request = request.query(&[("pageCursor", c.as_str())]);
            }

            let response = request.send()?;
            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::ReadwiseApi {
                    status,
                    body: response.text().unwrap_or_default(),
                });
            }

            let page: DocumentPage = response.json()?;
            all_items.extend(page.results);

            cursor = page.next_page_cursor.filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
            println!("Fetched {} items so far...", all_items.len());
        }

        println!("{} Found {} archived items", "✓".green(), all_items.len());
        Ok(all_items)
    }
}

/// Keep only documents carrying `tag`, and report how many survived.
pub fn filter_by_tag(documents: Vec<Document>, tag: &str) -> Vec<Document> {
    let filtered: Vec<Document> = documents.into_iter().filter(|d| d.has_tag(tag)).collect();
    println!(
        "{} Filtered to {} items with tag '{}'",
        "✓".green(),
        filtered.len(),
        tag
    );
    filtered
}

fn naive_local_iso(timestamp: i64) -> String {
    let datetime = Local
        .timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or_else(Local::now);
    datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
}
