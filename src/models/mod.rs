// src/models/mod.rs

//! Domain models for the discovery pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;
mod profile;
mod result;
mod selectors;
mod source;

// Re-export all public types
pub use config::{
    CleaningConfig, Config, CrawlerConfig, EligibilityConfig, LocationConfig, RankingConfig,
};
pub use posting::{CanonicalLocation, NormalizedPosting, Posting};
pub use profile::{CandidateProfile, Query};
pub use result::{DiscoveryReport, DiscoveryStats, MatchBreakdown, MatchResult};
pub use selectors::{BoardConfig, BoardSelectors};
pub use source::{Market, SourceKind};
