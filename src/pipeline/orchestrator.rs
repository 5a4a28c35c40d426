// src/pipeline/orchestrator.rs

//! Discovery run: fan out search tasks, then normalize, filter, score and rank.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::location::LocationRegistry;
use crate::models::{
    CandidateProfile, Config, DiscoveryReport, DiscoveryStats, Query, SourceKind,
};
use crate::pipeline::eligibility::EligibilityFilter;
use crate::pipeline::gather::{TaskFailure, TaskOutcome, gather_isolated};
use crate::pipeline::normalize::{Normalizer, dedup};
use crate::pipeline::ranker::rank;
use crate::pipeline::scorer::Scorer;
use crate::sources::{JobSource, SearchTask, build_sources};
use crate::utils::http::create_async_client;

/// Job discovery over a set of sources.
pub struct Discovery {
    config: Arc<Config>,
    registry: Arc<LocationRegistry>,
    sources: Vec<Arc<dyn JobSource>>,
    reference_date: Option<NaiveDate>,
}

impl Discovery {
    /// Build the enabled sources from configuration.
    pub fn new(config: Arc<Config>, registry: Arc<LocationRegistry>) -> Result<Self> {
        config.validate()?;
        let client = create_async_client(&config.crawler)?;
        let sources = build_sources(&config, &config.enabled_sources, &client)?;
        Ok(Self::with_sources(config, registry, sources))
    }

    /// Use the given adapters instead of the configured ones.
    pub fn with_sources(
        config: Arc<Config>,
        registry: Arc<LocationRegistry>,
        sources: Vec<Arc<dyn JobSource>>,
    ) -> Self {
        Self {
            config,
            registry,
            sources,
            reference_date: None,
        }
    }

    /// Resolve relative posting dates against `date` instead of today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn source_kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Search every selected source and return ranked matches.
    ///
    /// Source failures and the discovery timeout degrade the result; only an
    /// invalid query or profile is an error.
    pub async fn discover(
        &self,
        query: &Query,
        profile: &CandidateProfile,
    ) -> Result<DiscoveryReport> {
        query.validate()?;
        profile.validate()?;
        let started = Instant::now();

        let selected = self.select_sources(&query.sources)?;
        let tasks = build_tasks(&selected, query);
        let crawler = &self.config.crawler;

        log::info!(
            "discovery: {} tasks across {} sources",
            tasks.len(),
            selected.len()
        );

        let gathered = gather_isolated(
            tasks
                .iter()
                .map(|(source, task)| (task.source, source.fetch(task))),
            crawler.max_concurrent,
            Duration::from_secs(crawler.discover_timeout_secs),
        )
        .await;

        let mut stats = DiscoveryStats {
            tasks_attempted: tasks.len(),
            sources_attempted: selected.iter().map(|s| s.kind()).collect(),
            timed_out: gathered.timed_out,
            ..DiscoveryStats::default()
        };
        if gathered.timed_out {
            log::warn!(
                "discovery: timed out after {}s, returning partial results",
                crawler.discover_timeout_secs
            );
        }

        let mut succeeded = BTreeSet::new();
        let mut raw = Vec::new();
        for ((_, task), outcome) in tasks.iter().zip(gathered.outcomes) {
            match outcome {
                TaskOutcome::Succeeded(page) => {
                    stats.tasks_succeeded += 1;
                    stats.parse_warnings += page.warnings.len();
                    succeeded.insert(task.source);
                    raw.extend(page.postings);
                }
                TaskOutcome::Failed(failure) => {
                    stats.tasks_failed += 1;
                    if matches!(failure, TaskFailure::TimedOut) {
                        stats.tasks_timed_out += 1;
                    }
                    log::warn!(
                        "{} '{}' @ '{}': {}",
                        task.source,
                        task.keyword,
                        task.location_or_empty(),
                        failure
                    );
                }
            }
        }
        stats.sources_succeeded = stats
            .sources_attempted
            .iter()
            .copied()
            .filter(|kind| succeeded.contains(kind))
            .collect();
        stats.postings_fetched = raw.len();

        if stats.all_sources_failed() {
            log::warn!("discovery: every source failed");
        }

        let snapshot = self.registry.snapshot();
        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let normalizer = Normalizer::new(
            Arc::clone(&snapshot),
            self.registry.fallback_province(),
            today,
        );

        let normalized = dedup(raw.into_iter().map(|p| normalizer.normalize(p)).collect());
        stats.postings_after_dedup = normalized.len();

        let eligible =
            EligibilityFilter::new(&self.config.eligibility).apply(normalized, query.remote_only);
        stats.postings_eligible = eligible.len();

        let scorer = Scorer::new(snapshot);
        let scored = eligible.iter().map(|p| scorer.score(p, profile)).collect();
        let top_k = query.top_k.unwrap_or(self.config.ranking.top_k);
        let results = rank(scored, top_k);

        stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "discovery: {}/{} tasks ok, {} fetched, {} unique, {} eligible, {} returned in {}ms",
            stats.tasks_succeeded,
            stats.tasks_attempted,
            stats.postings_fetched,
            stats.postings_after_dedup,
            stats.postings_eligible,
            results.len(),
            stats.elapsed_ms
        );

        Ok(DiscoveryReport { results, stats })
    }

    /// Sources named by the query, or every source when it names none.
    fn select_sources(&self, requested: &[SourceKind]) -> Result<Vec<Arc<dyn JobSource>>> {
        if requested.is_empty() {
            return Ok(self.sources.clone());
        }

        let mut seen = BTreeSet::new();
        requested
            .iter()
            .filter(|kind| seen.insert(**kind))
            .map(|kind| {
                self.sources
                    .iter()
                    .find(|s| s.kind() == *kind)
                    .cloned()
                    .ok_or_else(|| AppError::validation(format!("source {kind} is not configured")))
            })
            .collect()
    }
}

/// Cross-product of sources, keywords and locations in discovery order.
///
/// Tasks are grouped by source; `gather_isolated` runs one lane per source.
fn build_tasks(
    sources: &[Arc<dyn JobSource>],
    query: &Query,
) -> Vec<(Arc<dyn JobSource>, SearchTask)> {
    let keywords: Vec<&str> = query
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    let locations: Vec<Option<&str>> = if query.locations.is_empty() {
        vec![None]
    } else {
        query.locations.iter().map(|l| Some(l.as_str())).collect()
    };

    let mut tasks = Vec::new();
    for source in sources {
        for keyword in &keywords {
            for location in &locations {
                let task = SearchTask {
                    index: tasks.len(),
                    source: source.kind(),
                    keyword: keyword.to_string(),
                    location: location.map(String::from),
                };
                tasks.push((Arc::clone(source), task));
            }
        }
    }
    tasks
}
