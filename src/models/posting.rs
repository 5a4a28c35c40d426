//! Job posting data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::SourceKind;

/// A job posting as produced by a source adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Posting {
    /// Job title
    pub title: String,

    /// Hiring company or agency
    pub company: String,

    /// Location text as shown by the board
    #[serde(default)]
    pub location: String,

    /// Salary text as shown by the board
    #[serde(default)]
    pub salary: String,

    /// Listing summary or full description
    #[serde(default)]
    pub description: String,

    /// Board the posting came from
    pub source: SourceKind,

    /// Absolute URL of the posting
    #[serde(default)]
    pub url: String,

    /// Posted date text, if the board shows one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,

    /// Board marks the job as remote
    #[serde(default)]
    pub remote: bool,

    /// Board marks the job as work-from-home
    #[serde(default)]
    pub work_from_home: bool,

    /// Board marks the hours as flexible
    #[serde(default)]
    pub flexible_hours: bool,

    /// Stated working timezone (e.g. "UTC+2", "CET")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Posting {
    /// Create a posting with the always-present fields.
    pub fn new(source: SourceKind, title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: String::new(),
            salary: String::new(),
            description: String::new(),
            source,
            url: String::new(),
            posted_date: None,
            remote: false,
            work_from_home: false,
            flexible_hours: false,
            timezone: None,
        }
    }

    /// The posting explicitly allows remote work.
    pub fn is_remote_capable(&self) -> bool {
        self.remote || self.work_from_home
    }

    /// Remote by flag or by its location text.
    pub fn looks_remote(&self) -> bool {
        self.is_remote_capable() || self.location.to_lowercase().contains("remote")
    }
}

/// Canonical (place, province) pair for a posting location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CanonicalLocation {
    /// Matched city/town/village, or the trimmed raw text when unmatched
    pub place: String,

    /// Province code (e.g. "GP")
    pub province_code: String,

    /// Province display name (e.g. "Gauteng")
    pub province_name: String,

    /// Metro/region inside the province, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// False when the province is the configured fallback
    pub resolved: bool,
}

/// A posting with canonical salary, location and date fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedPosting {
    #[serde(flatten)]
    pub posting: Posting,

    /// Parsed salary amount, 0 when unknown
    pub salary_value: f64,

    pub canonical_location: CanonicalLocation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_on: Option<NaiveDate>,
}
