// src/sources/remoteok.rs

//! RemoteOK JSON feed adapter.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use serde_json::Value;

use crate::error::{ParseWarning, SourceError};
use crate::models::{BoardConfig, Posting, SourceKind};
use crate::sources::{JobSource, SearchTask, SourcePage};
use crate::utils::build_search_url;
use crate::utils::http::{Throttle, fetch_text};

type SourceResult<T> = std::result::Result<T, SourceError>;

/// Adapter for the RemoteOK public API.
///
/// The feed is a JSON array whose first element is a legal notice. Every
/// posting on it is remote.
pub struct RemoteOkSource {
    board: BoardConfig,
    client: Client,
    throttle: Throttle,
}

impl RemoteOkSource {
    pub fn new(board: BoardConfig, client: Client, throttle: Throttle) -> Self {
        Self {
            board,
            client,
            throttle,
        }
    }

    /// Parse a feed body into postings.
    pub fn parse_feed(&self, body: &str) -> SourceResult<SourcePage> {
        let kind = self.board.kind;
        let value: Value = serde_json::from_str(body)
            .map_err(|e| SourceError::unparsable(kind, format!("invalid JSON: {e}")))?;
        let items = value
            .as_array()
            .ok_or_else(|| SourceError::unparsable(kind, "feed is not a JSON array"))?;

        let mut page = SourcePage::default();
        for (index, item) in items.iter().enumerate() {
            if item.get("legal").is_some() {
                continue;
            }
            match self.parse_item(item) {
                Ok(posting) => page.postings.push(posting),
                Err(reason) => {
                    let warning = ParseWarning::new(kind, index, reason);
                    log::warn!("{warning}");
                    page.warnings.push(warning);
                }
            }
        }
        Ok(page)
    }

    fn parse_item(&self, item: &Value) -> Result<Posting, &'static str> {
        let title = text_field(item, "position").ok_or("missing position")?;
        let company = text_field(item, "company").ok_or("missing company")?;

        let location = text_field(item, "location").unwrap_or_default();
        let description = text_field(item, "description")
            .map(|html| strip_html(&html))
            .unwrap_or_default();

        let mut posting = Posting::new(self.board.kind, title, company);
        posting.salary = salary_range(item);
        posting.url = text_field(item, "url").unwrap_or_default();
        posting.posted_date = text_field(item, "date");
        posting.remote = true;

        let lower = location.to_lowercase();
        posting.flexible_hours = lower.contains("worldwide")
            || lower.contains("anywhere")
            || description.to_lowercase().contains("flexible hours");
        posting.timezone = if location.is_empty() {
            self.board.default_timezone.clone()
        } else {
            Some(location.clone())
        };
        posting.location = if location.is_empty() {
            "Remote".to_string()
        } else {
            location
        };
        posting.description = description;
        Ok(posting)
    }
}

#[async_trait]
impl JobSource for RemoteOkSource {
    fn kind(&self) -> SourceKind {
        self.board.kind
    }

    async fn fetch(&self, task: &SearchTask) -> SourceResult<SourcePage> {
        let kind = self.board.kind;
        let tag = task.keyword.trim().to_lowercase().replace(' ', "-");
        let url = build_search_url(
            &self.board.search_url,
            &[(self.board.keyword_param.as_str(), tag.as_str())],
        )
        .map_err(|e| SourceError::InvalidUrl {
            source_kind: kind,
            message: e.to_string(),
        })?;

        self.throttle.wait().await;
        log::debug!("{kind}: fetching {url}");
        let body = fetch_text(&self.client, kind, url.as_str()).await?;
        self.parse_feed(&body)
    }
}

/// Non-empty trimmed string field.
fn text_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn salary_range(item: &Value) -> String {
    let amount = |key: &str| item.get(key).and_then(Value::as_u64).unwrap_or(0);
    match (amount("salary_min"), amount("salary_max")) {
        (0, _) => String::new(),
        (min, 0) => format!("${min}"),
        (min, max) => format!("${min} - ${max}"),
    }
}

fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::Config;

    const FEED: &str = r#"[
        {"legal": "API Terms of Service apply"},
        {
            "id": "1",
            "position": "Senior Rust Engineer",
            "company": "Ferrous Systems",
            "location": "Worldwide",
            "description": "<p>Build <b>async</b> services.</p><p>Docker and AWS.</p>",
            "url": "https://remoteok.com/remote-jobs/1",
            "date": "2025-03-10T08:00:00+00:00",
            "salary_min": 90000,
            "salary_max": 120000
        },
        {
            "id": "2",
            "position": "Platform Engineer",
            "company": "Northwind",
            "location": "UTC+2",
            "url": "https://remoteok.com/remote-jobs/2",
            "salary_min": 0,
            "salary_max": 0
        },
        {"id": "3", "company": "No Title Ltd"}
    ]"#;

    fn source() -> RemoteOkSource {
        let config = Config::default();
        let board = config.board(SourceKind::RemoteOk).unwrap().clone();
        RemoteOkSource::new(board, Client::new(), Throttle::new(Duration::ZERO))
    }

    #[test]
    fn parses_feed_and_skips_notice() {
        let page = source().parse_feed(FEED).unwrap();
        assert_eq!(page.postings.len(), 2);
        assert_eq!(page.warnings.len(), 1);
        assert_eq!(page.warnings[0].index, 3);

        let first = &page.postings[0];
        assert_eq!(first.title, "Senior Rust Engineer");
        assert_eq!(first.company, "Ferrous Systems");
        assert_eq!(first.salary, "$90000 - $120000");
        assert_eq!(first.description, "Build async services. Docker and AWS.");
        assert!(first.remote);
        assert!(first.flexible_hours);
        assert_eq!(first.source, SourceKind::RemoteOk);

        let second = &page.postings[1];
        assert_eq!(second.salary, "");
        assert_eq!(second.timezone.as_deref(), Some("UTC+2"));
        assert!(!second.flexible_hours);
    }

    #[test]
    fn empty_array_is_empty_success() {
        let page = source().parse_feed("[]").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn non_array_is_unparsable() {
        let err = source().parse_feed(r#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, SourceError::UnparsablePage { .. }));

        let err = source().parse_feed("<html>blocked</html>").unwrap_err();
        assert!(matches!(err, SourceError::UnparsablePage { .. }));
    }

    #[test]
    fn strips_markup() {
        assert_eq!(strip_html("<ul><li>One</li><li>Two</li></ul>"), "One Two");
    }
}
