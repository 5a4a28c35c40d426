// src/pipeline/eligibility.rs

//! Eligibility gates for international postings.

use crate::models::{EligibilityConfig, NormalizedPosting, Posting};

/// Decides whether a posting can be applied to from the local market.
///
/// International postings must pass the timezone, visa and remote gates.
/// Local postings bypass all three.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    timezones: Vec<String>,
    phrases: Vec<String>,
}

impl EligibilityFilter {
    pub fn new(config: &EligibilityConfig) -> Self {
        Self {
            timezones: config
                .compatible_timezones
                .iter()
                .map(|tz| tz.trim().to_uppercase())
                .filter(|tz| !tz.is_empty())
                .collect(),
            phrases: config
                .disqualifying_phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Compatible timezone, or flexible hours.
    pub fn timezone_ok(&self, posting: &Posting) -> bool {
        if posting.flexible_hours {
            return true;
        }
        posting.timezone.as_deref().is_some_and(|tz| {
            let tz = tz.to_uppercase();
            self.timezones.iter().any(|compatible| tz.contains(compatible))
        })
    }

    /// No disqualifying phrase in the description.
    pub fn visa_ok(&self, posting: &Posting) -> bool {
        let description = posting.description.to_lowercase();
        !self.phrases.iter().any(|phrase| description.contains(phrase))
    }

    pub fn remote_ok(&self, posting: &Posting) -> bool {
        posting.is_remote_capable()
    }

    pub fn is_eligible(&self, posting: &Posting) -> bool {
        if !posting.source.is_international() {
            return true;
        }
        self.timezone_ok(posting) && self.visa_ok(posting) && self.remote_ok(posting)
    }

    /// Eligible, and remote when `remote_only` is requested.
    pub fn admits(&self, posting: &Posting, remote_only: bool) -> bool {
        self.is_eligible(posting) && (!remote_only || posting.looks_remote())
    }

    /// Keep admitted postings in order.
    pub fn apply(&self, postings: Vec<NormalizedPosting>, remote_only: bool) -> Vec<NormalizedPosting> {
        let before = postings.len();
        let kept: Vec<_> = postings
            .into_iter()
            .filter(|p| self.admits(&p.posting, remote_only))
            .collect();

        if kept.len() < before {
            log::debug!("eligibility: dropped {} of {} postings", before - kept.len(), before);
        }
        kept
    }
}
