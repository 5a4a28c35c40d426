//! Candidate profile and discovery query.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SourceKind;

/// Candidate data supplied by the profile store.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CandidateProfile {
    /// Lowercase skill names
    #[serde(default)]
    pub skills: BTreeSet<String>,

    #[serde(default)]
    pub years_experience: f64,

    /// Free-text locations, matched against the province table
    #[serde(default)]
    pub preferred_locations: Vec<String>,

    /// Expected salary; 0 means unspecified
    #[serde(default)]
    pub expected_salary: f64,

    /// Highest qualification, free-form
    #[serde(default)]
    pub education: String,
}

impl CandidateProfile {
    /// Load a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut profile: Self = toml::from_str(&content)?;
        profile.skills = profile
            .skills
            .into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.years_experience.is_finite() || self.years_experience < 0.0 {
            return Err(AppError::validation(
                "years_experience must be a non-negative number",
            ));
        }
        if !self.expected_salary.is_finite() || self.expected_salary < 0.0 {
            return Err(AppError::validation(
                "expected_salary must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// Input to a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Query {
    /// Search keywords; at least one is required
    pub keywords: Vec<String>,

    /// Locations to search; empty means "any"
    #[serde(default)]
    pub locations: Vec<String>,

    /// Boards to query; empty means every enabled board
    #[serde(default)]
    pub sources: Vec<SourceKind>,

    /// Keep only remote-capable postings
    #[serde(default)]
    pub remote_only: bool,

    /// Overrides `ranking.top_k`
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl Query {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = SourceKind>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    pub fn remote_only(mut self, remote_only: bool) -> Self {
        self.remote_only = remote_only;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Reject queries that cannot produce any search task.
    pub fn validate(&self) -> Result<()> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AppError::validation("query needs at least one keyword"));
        }
        if self.top_k == Some(0) {
            return Err(AppError::validation("top_k must be > 0"));
        }
        Ok(())
    }
}
