//! Job board adapters.
//!
//! Every board sits behind the `JobSource` trait:
//! - `HtmlBoardSource`: CSS-selector driven boards (the South African boards
//!   and WeWorkRemotely)
//! - `RemoteOkSource`: the RemoteOK JSON feed
//!
//! Adapters are built from configuration by [`build_sources`].

mod board;
mod remoteok;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, ParseWarning, Result, SourceError};
use crate::models::{Config, Posting, SourceKind};
use crate::utils::http::Throttle;

pub use board::HtmlBoardSource;
pub use remoteok::RemoteOkSource;

/// One (source, keyword, location) combination of a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    /// Position in the task cross-product; defines discovery order
    pub index: usize,
    pub source: SourceKind,
    pub keyword: String,
    /// `None` searches every location
    pub location: Option<String>,
}

impl SearchTask {
    pub fn location_or_empty(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }
}

/// Postings from one adapter call plus the listings it had to skip.
#[derive(Debug, Default)]
pub struct SourcePage {
    pub postings: Vec<Posting>,
    pub warnings: Vec<ParseWarning>,
}

impl SourcePage {
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty() && self.warnings.is_empty()
    }

    pub fn extend(&mut self, other: SourcePage) {
        self.postings.extend(other.postings);
        self.warnings.extend(other.warnings);
    }
}

/// A job board that can be searched.
///
/// Zero results is a successful empty page. Malformed listings are reported
/// as warnings; only an unusable page or transport failure is an error.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self, task: &SearchTask) -> std::result::Result<SourcePage, SourceError>;
}

/// Build adapters for the given boards from configuration.
pub fn build_sources(
    config: &Config,
    kinds: &[SourceKind],
    client: &reqwest::Client,
) -> Result<Vec<Arc<dyn JobSource>>> {
    let delay = Duration::from_millis(config.crawler.request_delay_ms);

    kinds
        .iter()
        .map(|kind| {
            let board = config
                .board(*kind)
                .ok_or_else(|| AppError::config(format!("no board configured for {kind}")))?
                .clone();
            let throttle = Throttle::new(delay);
            let source: Arc<dyn JobSource> = match kind {
                SourceKind::RemoteOk => Arc::new(RemoteOkSource::new(board, client.clone(), throttle)),
                _ => Arc::new(HtmlBoardSource::new(
                    board,
                    config.cleaning.clone(),
                    config.crawler.max_pages,
                    client.clone(),
                    throttle,
                )),
            };
            Ok(source)
        })
        .collect()
}
