// src/models/selectors.rs

//! Board search endpoints and the CSS selectors used to scrape them.

use serde::{Deserialize, Serialize};

use crate::models::SourceKind;

/// CSS selectors for scraping a job board results page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardSelectors {
    /// Selector for each listing card
    #[serde(default = "default_listing")]
    pub listing_selector: String,

    /// Selector for the title element within a card
    #[serde(default = "default_title")]
    pub title_selector: String,

    /// Selector for the company element within a card
    #[serde(default = "default_company")]
    pub company_selector: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_selector: Option<String>,

    /// Selector for the link element (title element when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_selector: Option<String>,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "default_attr_name")]
    pub attr_name: String,

    /// Element whose presence inside a card marks the job as remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_selector: Option<String>,

    /// Element the board renders when a search has no hits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_results_selector: Option<String>,
}

fn default_listing() -> String {
    "article".to_string()
}

fn default_title() -> String {
    "h2 a".to_string()
}

fn default_company() -> String {
    ".company".to_string()
}

fn default_attr_name() -> String {
    "href".to_string()
}

impl Default for BoardSelectors {
    fn default() -> Self {
        Self {
            listing_selector: default_listing(),
            title_selector: default_title(),
            company_selector: default_company(),
            location_selector: None,
            salary_selector: None,
            description_selector: None,
            date_selector: None,
            link_selector: None,
            attr_name: default_attr_name(),
            remote_selector: None,
            no_results_selector: None,
        }
    }
}

impl BoardSelectors {
    /// Create selectors with the required listing/title/company parts.
    pub fn from_parts(
        listing: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            listing_selector: listing.into(),
            title_selector: title.into(),
            company_selector: company.into(),
            ..Self::default()
        }
    }

    pub fn location(mut self, selector: impl Into<String>) -> Self {
        self.location_selector = Some(selector.into());
        self
    }

    pub fn salary(mut self, selector: impl Into<String>) -> Self {
        self.salary_selector = Some(selector.into());
        self
    }

    pub fn description(mut self, selector: impl Into<String>) -> Self {
        self.description_selector = Some(selector.into());
        self
    }

    pub fn date(mut self, selector: impl Into<String>) -> Self {
        self.date_selector = Some(selector.into());
        self
    }

    pub fn link(mut self, selector: impl Into<String>) -> Self {
        self.link_selector = Some(selector.into());
        self
    }

    pub fn remote(mut self, selector: impl Into<String>) -> Self {
        self.remote_selector = Some(selector.into());
        self
    }

    pub fn no_results(mut self, selector: impl Into<String>) -> Self {
        self.no_results_selector = Some(selector.into());
        self
    }
}

/// Search endpoint and scraping rules for one board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    pub kind: SourceKind,

    /// Search endpoint; query parameters are appended
    pub search_url: String,

    /// Query parameter carrying the keyword
    #[serde(default = "default_keyword_param")]
    pub keyword_param: String,

    /// Query parameter carrying the location, if the board supports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_param: Option<String>,

    /// Query parameter carrying the page, if the board paginates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_param: Option<String>,

    /// Value of the first page
    #[serde(default)]
    pub page_start: usize,

    /// Increment between pages (10 for offset-based paging)
    #[serde(default = "default_page_step")]
    pub page_step: usize,

    /// Every posting on the board is remote
    #[serde(default)]
    pub remote_board: bool,

    /// Timezone to stamp on postings that do not state one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_timezone: Option<String>,

    #[serde(flatten)]
    pub selectors: BoardSelectors,
}

fn default_keyword_param() -> String {
    "q".to_string()
}

fn default_page_step() -> usize {
    1
}

impl BoardConfig {
    pub fn new(kind: SourceKind, search_url: impl Into<String>, selectors: BoardSelectors) -> Self {
        Self {
            kind,
            search_url: search_url.into(),
            keyword_param: default_keyword_param(),
            location_param: None,
            page_param: None,
            page_start: 0,
            page_step: default_page_step(),
            remote_board: false,
            default_timezone: None,
            selectors,
        }
    }

    /// Page parameter value for the zero-based page index.
    pub fn page_value(&self, page_index: usize) -> usize {
        self.page_start + page_index * self.page_step
    }
}
