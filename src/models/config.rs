//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, SourceKind};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Boards queried when a query names no sources
    #[serde(default = "defaults::enabled_sources")]
    pub enabled_sources: Vec<SourceKind>,

    /// Search endpoints and selectors per board
    #[serde(default = "defaults::boards")]
    pub boards: Vec<BoardConfig>,

    /// Gates for international postings
    #[serde(default)]
    pub eligibility: EligibilityConfig,

    /// Province table fallbacks
    #[serde(default)]
    pub locations: LocationConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    /// Text preprocessing settings
    #[serde(default)]
    pub cleaning: CleaningConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Board configuration for a source, if any.
    pub fn board(&self, kind: SourceKind) -> Option<&BoardConfig> {
        self.boards.iter().find(|b| b.kind == kind)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.discover_timeout_secs == 0 {
            return Err(AppError::validation(
                "crawler.discover_timeout_secs must be > 0",
            ));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::validation("crawler.max_pages must be > 0"));
        }
        if self.enabled_sources.is_empty() {
            return Err(AppError::validation("No sources enabled"));
        }
        for kind in &self.enabled_sources {
            if self.board(*kind).is_none() {
                return Err(AppError::validation(format!(
                    "enabled source {kind} has no [[boards]] entry"
                )));
            }
        }
        for board in &self.boards {
            if board.search_url.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "boards.{}: search_url is empty",
                    board.kind
                )));
            }
            if board.page_step == 0 {
                return Err(AppError::validation(format!(
                    "boards.{}: page_step must be > 0",
                    board.kind
                )));
            }
        }
        if self.locations.fallback_province.trim().is_empty()
            || self.locations.default_province.trim().is_empty()
        {
            return Err(AppError::validation("locations provinces must be set"));
        }
        if self.ranking.top_k == 0 {
            return Err(AppError::validation("ranking.top_k must be > 0"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            enabled_sources: defaults::enabled_sources(),
            boards: defaults::boards(),
            eligibility: EligibilityConfig::default(),
            locations: LocationConfig::default(),
            ranking: RankingConfig::default(),
            cleaning: CleaningConfig::default(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum delay between requests to the same board in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent search tasks
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Time budget for a whole discovery run
    #[serde(default = "defaults::discover_timeout")]
    pub discover_timeout_secs: u64,

    /// Result pages fetched per search task
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            discover_timeout_secs: defaults::discover_timeout(),
            max_pages: defaults::max_pages(),
        }
    }
}

/// Eligibility gates applied to international postings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Timezone tokens compatible with the candidate's working hours
    #[serde(default = "defaults::compatible_timezones")]
    pub compatible_timezones: Vec<String>,

    /// Description phrases that disqualify a posting
    #[serde(default = "defaults::disqualifying_phrases")]
    pub disqualifying_phrases: Vec<String>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            compatible_timezones: defaults::compatible_timezones(),
            disqualifying_phrases: defaults::disqualifying_phrases(),
        }
    }
}

/// Province fallbacks for the location table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Province assigned to posting locations not found in the table
    #[serde(default = "defaults::province")]
    pub fallback_province: String,

    /// Province for new custom locations no rule matches
    #[serde(default = "defaults::province")]
    pub default_province: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback_province: defaults::province(),
            default_province: defaults::province(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Results kept after ranking
    #[serde(default = "defaults::top_k")]
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::top_k(),
        }
    }
}

/// Text cleaning/preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Patterns to remove from titles (badges like "NEW", "Featured")
    #[serde(default = "defaults::title_remove_patterns")]
    pub title_remove_patterns: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            title_remove_patterns: defaults::title_remove_patterns(),
        }
    }
}

impl CleaningConfig {
    /// Clean a title string.
    ///
    /// Patterns are removed only as whole words, so "NEW" drops the badge
    /// but leaves "NEWS Editor" alone.
    pub fn clean_title(&self, text: &str) -> String {
        let mut tokens: Vec<&str> = text.split_whitespace().collect();
        for pattern in &self.title_remove_patterns {
            let needle: Vec<&str> = pattern.split_whitespace().collect();
            if needle.is_empty() {
                continue;
            }
            let mut i = 0;
            while i + needle.len() <= tokens.len() {
                if tokens[i..i + needle.len()] == needle[..] {
                    tokens.drain(i..i + needle.len());
                } else {
                    i += 1;
                }
            }
        }
        tokens.join(" ")
    }

    /// Collapse whitespace in any scraped field.
    pub fn clean_field(&self, text: &str) -> String {
        Self::normalize_whitespace(text)
    }

    fn normalize_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

mod defaults {
    use crate::models::{BoardConfig, BoardSelectors, SourceKind};

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobscout/0.1)".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn request_delay() -> u64 {
        2000
    }
    pub fn max_concurrent() -> usize {
        8
    }
    pub fn discover_timeout() -> u64 {
        120
    }
    pub fn max_pages() -> usize {
        1
    }

    pub fn enabled_sources() -> Vec<SourceKind> {
        SourceKind::ALL.to_vec()
    }

    // Eligibility defaults
    pub fn compatible_timezones() -> Vec<String> {
        ["UTC", "UTC+1", "UTC+2", "UTC+3", "GMT", "CET", "EET"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn disqualifying_phrases() -> Vec<String> {
        [
            "visa sponsorship",
            "relocation required",
            "must relocate",
            "us citizenship required",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn province() -> String {
        "GP".into()
    }

    pub fn top_k() -> usize {
        50
    }

    pub fn title_remove_patterns() -> Vec<String> {
        vec!["NEW".into(), "Featured".into(), "Promoted".into()]
    }

    // Board defaults
    pub fn boards() -> Vec<BoardConfig> {
        vec![
            BoardConfig {
                keyword_param: "keywords".into(),
                location_param: Some("location".into()),
                page_param: Some("page".into()),
                page_start: 1,
                ..BoardConfig::new(
                    SourceKind::CareerJunction,
                    "https://www.careerjunction.co.za/jobs/results",
                    BoardSelectors::from_parts(".module.job-result", ".job-result-title h2 a", ".job-result-title h3 a")
                        .location(".job-result-overview .location")
                        .salary(".job-result-overview .salary")
                        .description(".job-result-overview .description")
                        .date(".job-result-overview .date-posted")
                        .no_results(".no-results"),
                )
            },
            BoardConfig {
                location_param: Some("where".into()),
                page_param: Some("page".into()),
                page_start: 1,
                ..BoardConfig::new(
                    SourceKind::PNet,
                    "https://www.pnet.co.za/jobs",
                    BoardSelectors::from_parts("article[data-at='job-item']", "a[data-at='job-item-title']", "[data-at='job-item-company-name']")
                        .location("[data-at='job-item-location']")
                        .salary("[data-at='job-item-salary-info']")
                        .description("[data-at='job-item-middle']")
                        .date("time")
                        .remote("[data-at='job-item-work-from-home']")
                        .no_results("[data-at='no-results']"),
                )
            },
            BoardConfig {
                location_param: Some("l".into()),
                page_param: Some("start".into()),
                page_start: 0,
                page_step: 10,
                ..BoardConfig::new(
                    SourceKind::IndeedZa,
                    "https://za.indeed.com/jobs",
                    BoardSelectors::from_parts("div.job_seen_beacon", "h2.jobTitle a", "[data-testid='company-name']")
                        .location("[data-testid='text-location']")
                        .salary(".salary-snippet-container")
                        .description(".job-snippet")
                        .date(".date")
                        .no_results(".jobsearch-NoResult-messageContainer"),
                )
            },
            BoardConfig {
                keyword_param: "keywords".into(),
                location_param: Some("location".into()),
                page_param: Some("page".into()),
                page_start: 1,
                ..BoardConfig::new(
                    SourceKind::CareerBox,
                    "https://www.careerbox.co.za/jobs",
                    BoardSelectors::from_parts(".job-listing", ".job-title a", ".company-name")
                        .location(".job-location")
                        .salary(".salary")
                        .description(".job-description")
                        .date(".date-posted"),
                )
            },
            BoardConfig {
                keyword_param: "keyword".into(),
                location_param: Some("location".into()),
                page_param: Some("page".into()),
                page_start: 1,
                ..BoardConfig::new(
                    SourceKind::JobMail,
                    "https://www.jobmail.co.za/jobs",
                    BoardSelectors::from_parts(".job-item", ".job-title a", ".job-company")
                        .location(".job-location")
                        .salary(".job-salary")
                        .description(".job-summary")
                        .date(".job-date"),
                )
            },
            BoardConfig {
                keyword_param: "search".into(),
                location_param: Some("location".into()),
                page_param: Some("page".into()),
                page_start: 1,
                ..BoardConfig::new(
                    SourceKind::Jobs4All,
                    "https://www.jobs4all.co.za/jobs",
                    BoardSelectors::from_parts(".job-item", ".job-title a", ".company-name")
                        .location(".location")
                        .salary(".salary")
                        .description(".job-description")
                        .date(".date-posted"),
                )
            },
            BoardConfig {
                keyword_param: "tags".into(),
                remote_board: true,
                ..BoardConfig::new(
                    SourceKind::RemoteOk,
                    "https://remoteok.com/api",
                    BoardSelectors::default(),
                )
            },
            BoardConfig {
                keyword_param: "term".into(),
                remote_board: true,
                ..BoardConfig::new(
                    SourceKind::WeWorkRemotely,
                    "https://weworkremotely.com/remote-jobs/search",
                    BoardSelectors::from_parts("section.jobs li:has(a .title)", ".title", ".company")
                        .location(".region")
                        .date(".date")
                        .link("a[href^='/remote-jobs/']"),
                )
            },
        ]
    }
}
