//! Scoring and discovery output structures.

use serde::{Deserialize, Serialize};

use crate::models::{NormalizedPosting, SourceKind};

/// The five weighted sub-scores, each in 0.0..=1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MatchBreakdown {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub salary: f64,
    pub education: f64,
}

/// A scored posting. Created once per scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// SHA-256 fingerprint of the dedup key
    pub id: String,

    #[serde(flatten)]
    pub posting: NormalizedPosting,

    /// 0-100, two decimals
    pub match_score: f64,

    pub match_breakdown: MatchBreakdown,
}

/// Completeness counters for a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiscoveryStats {
    pub tasks_attempted: usize,
    pub tasks_succeeded: usize,
    pub tasks_failed: usize,
    /// Tasks cancelled by the discovery timeout (counted in `tasks_failed`)
    pub tasks_timed_out: usize,

    pub sources_attempted: Vec<SourceKind>,
    /// Sources with at least one successful task
    pub sources_succeeded: Vec<SourceKind>,

    pub postings_fetched: usize,
    pub postings_after_dedup: usize,
    pub postings_eligible: usize,
    pub parse_warnings: usize,

    pub timed_out: bool,
    pub elapsed_ms: u64,
}

impl DiscoveryStats {
    /// Every attempted source failed.
    pub fn all_sources_failed(&self) -> bool {
        !self.sources_attempted.is_empty() && self.sources_succeeded.is_empty()
    }
}

/// Ranked results plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiscoveryReport {
    pub results: Vec<MatchResult>,
    pub stats: DiscoveryStats,
}
