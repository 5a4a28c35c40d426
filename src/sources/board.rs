// src/sources/board.rs

//! CSS-selector driven job board adapter.
//!
//! Fetches search result pages and maps each listing card to a `Posting`
//! using the selectors from the board's configuration.

use std::future::Future;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{ParseWarning, SourceError};
use crate::models::{BoardConfig, BoardSelectors, CleaningConfig, Posting, SourceKind};
use crate::sources::{JobSource, SearchTask, SourcePage};
use crate::utils::http::{Throttle, fetch_text};
use crate::utils::{build_search_url, resolve_url};

type SourceResult<T> = std::result::Result<T, SourceError>;

/// Adapter for HTML job boards.
pub struct HtmlBoardSource {
    board: BoardConfig,
    cleaning: CleaningConfig,
    max_pages: usize,
    client: Client,
    throttle: Throttle,
}

impl HtmlBoardSource {
    pub fn new(
        board: BoardConfig,
        cleaning: CleaningConfig,
        max_pages: usize,
        client: Client,
        throttle: Throttle,
    ) -> Self {
        Self {
            board,
            cleaning,
            max_pages: max_pages.max(1),
            client,
            throttle,
        }
    }

    /// Search URL for a task and zero-based page index.
    pub fn page_url(&self, task: &SearchTask, page_index: usize) -> SourceResult<Url> {
        let page_value = self.board.page_value(page_index).to_string();
        let mut params = vec![(self.board.keyword_param.as_str(), task.keyword.as_str())];
        if let Some(param) = &self.board.location_param {
            params.push((param.as_str(), task.location_or_empty()));
        }
        if let Some(param) = &self.board.page_param {
            params.push((param.as_str(), page_value.as_str()));
        }

        build_search_url(&self.board.search_url, &params).map_err(|e| SourceError::InvalidUrl {
            source_kind: self.board.kind,
            message: e.to_string(),
        })
    }

    /// Parse one results page.
    pub fn parse_page(&self, html: &str, page_url: &Url, task: &SearchTask) -> SourceResult<SourcePage> {
        let kind = self.board.kind;
        let selectors = CompiledSelectors::compile(kind, &self.board.selectors)?;
        let document = Html::parse_document(html);
        let cards: Vec<ElementRef> = document.select(&selectors.listing).collect();

        if cards.is_empty() {
            let marker_found = selectors
                .no_results
                .as_ref()
                .map(|sel| document.select(sel).next().is_some());
            return match marker_found {
                Some(false) => Err(SourceError::unparsable(
                    kind,
                    "no listing cards and no empty-result marker",
                )),
                _ => Ok(SourcePage::default()),
            };
        }

        let mut page = SourcePage::default();
        for (index, card) in cards.iter().enumerate() {
            match self.parse_listing(card, &selectors, page_url, task) {
                Ok(posting) => page.postings.push(posting),
                Err(reason) => {
                    let warning = ParseWarning::new(kind, index, reason);
                    log::warn!("{warning}");
                    page.warnings.push(warning);
                }
            }
        }

        if page.postings.is_empty() {
            return Err(SourceError::unparsable(
                kind,
                format!("all {} listings malformed", cards.len()),
            ));
        }
        Ok(page)
    }

    fn parse_listing(
        &self,
        card: &ElementRef,
        selectors: &CompiledSelectors,
        base_url: &Url,
        task: &SearchTask,
    ) -> Result<Posting, String> {
        let text_of = |selector: Option<&Selector>| {
            selector
                .and_then(|sel| card.select(sel).next())
                .map(|el| self.cleaning.clean_field(&el.text().collect::<String>()))
                .unwrap_or_default()
        };

        let title_elem = card.select(&selectors.title).next().ok_or("missing title")?;
        let title = self
            .cleaning
            .clean_title(&title_elem.text().collect::<String>());
        if title.is_empty() {
            return Err("empty title".into());
        }

        let company = text_of(Some(&selectors.company));
        if company.is_empty() {
            return Err(format!("missing company for '{title}'"));
        }

        let region = text_of(selectors.location.as_ref());
        let location = if region.is_empty() {
            task.location_or_empty().to_string()
        } else {
            region.clone()
        };
        let salary = text_of(selectors.salary.as_ref());
        let description = text_of(selectors.description.as_ref());

        let posted_date = selectors
            .date
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .map(|el| match el.value().attr("datetime") {
                Some(datetime) => datetime.trim().to_string(),
                None => self.cleaning.clean_field(&el.text().collect::<String>()),
            })
            .filter(|d| !d.is_empty());

        let link_elem = selectors
            .link
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .unwrap_or(title_elem);
        let url = link_elem
            .value()
            .attr(&self.board.selectors.attr_name)
            .map(|href| resolve_url(base_url, href))
            .unwrap_or_default();

        let remote_marker = selectors
            .remote
            .as_ref()
            .is_some_and(|sel| card.select(sel).next().is_some());
        let lower = format!("{location} {description}").to_lowercase();
        let region_lower = region.to_lowercase();

        let mut posting = Posting::new(self.board.kind, title, company);
        posting.location = location;
        posting.salary = salary;
        posting.description = description;
        posting.url = url;
        posting.posted_date = posted_date;
        posting.remote = self.board.remote_board || remote_marker;
        posting.work_from_home = lower.contains("work from home") || lower.contains("wfh");
        posting.flexible_hours = region_lower.contains("anywhere")
            || region_lower.contains("worldwide")
            || lower.contains("flexible hours")
            || lower.contains("flexible working hours");
        // Remote boards publish the hiring region where local boards put a place.
        posting.timezone = if self.board.remote_board && !region.is_empty() {
            Some(region)
        } else {
            self.board.default_timezone.clone()
        };
        Ok(posting)
    }
}

#[async_trait]
impl JobSource for HtmlBoardSource {
    fn kind(&self) -> SourceKind {
        self.board.kind
    }

    async fn fetch(&self, task: &SearchTask) -> SourceResult<SourcePage> {
        let kind = self.board.kind;
        self.fetch_pages(task, |url: Url| async move {
            fetch_text(&self.client, kind, url.as_str()).await
        })
        .await
    }
}

impl HtmlBoardSource {
    /// Walk result pages for one task, loading each page through `load`.
    ///
    /// Stops at the first empty page. An error on the first page fails the
    /// task; a later error keeps what was collected so far.
    async fn fetch_pages<F, Fut>(&self, task: &SearchTask, mut load: F) -> SourceResult<SourcePage>
    where
        F: FnMut(Url) -> Fut,
        Fut: Future<Output = SourceResult<String>>,
    {
        let kind = self.board.kind;
        let pages = if self.board.page_param.is_some() {
            self.max_pages
        } else {
            1
        };

        let mut collected = SourcePage::default();
        for page_index in 0..pages {
            let url = self.page_url(task, page_index)?;
            self.throttle.wait().await;
            log::debug!("{kind}: fetching {url}");

            let result = match load(url.clone()).await {
                Ok(html) => self.parse_page(&html, &url, task),
                Err(e) => Err(e),
            };

            match result {
                Ok(page) if page.is_empty() => break,
                Ok(page) => collected.extend(page),
                Err(e) if page_index == 0 => return Err(e),
                Err(e) => {
                    log::warn!("{kind}: stopping after page {page_index}: {e}");
                    break;
                }
            }
        }

        Ok(collected)
    }
}

/// Parsed form of `BoardSelectors`.
struct CompiledSelectors {
    listing: Selector,
    title: Selector,
    company: Selector,
    location: Option<Selector>,
    salary: Option<Selector>,
    description: Option<Selector>,
    date: Option<Selector>,
    link: Option<Selector>,
    remote: Option<Selector>,
    no_results: Option<Selector>,
}

impl CompiledSelectors {
    fn compile(kind: SourceKind, selectors: &BoardSelectors) -> SourceResult<Self> {
        let optional = |s: &Option<String>| {
            s.as_deref()
                .map(|s| parse_selector(kind, s))
                .transpose()
        };

        Ok(Self {
            listing: parse_selector(kind, &selectors.listing_selector)?,
            title: parse_selector(kind, &selectors.title_selector)?,
            company: parse_selector(kind, &selectors.company_selector)?,
            location: optional(&selectors.location_selector)?,
            salary: optional(&selectors.salary_selector)?,
            description: optional(&selectors.description_selector)?,
            date: optional(&selectors.date_selector)?,
            link: optional(&selectors.link_selector)?,
            remote: optional(&selectors.remote_selector)?,
            no_results: optional(&selectors.no_results_selector)?,
        })
    }
}

fn parse_selector(kind: SourceKind, s: &str) -> SourceResult<Selector> {
    Selector::parse(s).map_err(|e| SourceError::selector(kind, s, format!("{e:?}")))
}
