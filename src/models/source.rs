//! Job board identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which labour market a board serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// South African boards; postings are eligible by construction
    Local,
    /// Remote/international boards; postings go through the eligibility filter
    International,
}

/// The fixed set of supported job boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "careerjunction")]
    CareerJunction,
    #[serde(rename = "pnet")]
    PNet,
    #[serde(rename = "indeed_za")]
    IndeedZa,
    #[serde(rename = "careerbox")]
    CareerBox,
    #[serde(rename = "jobmail")]
    JobMail,
    #[serde(rename = "jobs4all")]
    Jobs4All,
    #[serde(rename = "remoteok")]
    RemoteOk,
    #[serde(rename = "weworkremotely")]
    WeWorkRemotely,
}

impl SourceKind {
    pub const ALL: [SourceKind; 8] = [
        SourceKind::CareerJunction,
        SourceKind::PNet,
        SourceKind::IndeedZa,
        SourceKind::CareerBox,
        SourceKind::JobMail,
        SourceKind::Jobs4All,
        SourceKind::RemoteOk,
        SourceKind::WeWorkRemotely,
    ];

    /// Display name of the board.
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::CareerJunction => "CareerJunction",
            SourceKind::PNet => "PNet",
            SourceKind::IndeedZa => "IndeedZA",
            SourceKind::CareerBox => "CareerBox",
            SourceKind::JobMail => "JobMail",
            SourceKind::Jobs4All => "Jobs4All",
            SourceKind::RemoteOk => "RemoteOK",
            SourceKind::WeWorkRemotely => "WeWorkRemotely",
        }
    }

    pub fn market(&self) -> Market {
        match self {
            SourceKind::RemoteOk | SourceKind::WeWorkRemotely => Market::International,
            _ => Market::Local,
        }
    }

    pub fn is_international(&self) -> bool {
        self.market() == Market::International
    }

    /// Configuration key (`indeed_za`, `remoteok`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::CareerJunction => "careerjunction",
            SourceKind::PNet => "pnet",
            SourceKind::IndeedZa => "indeed_za",
            SourceKind::CareerBox => "careerbox",
            SourceKind::JobMail => "jobmail",
            SourceKind::Jobs4All => "jobs4all",
            SourceKind::RemoteOk => "remoteok",
            SourceKind::WeWorkRemotely => "weworkremotely",
        }
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    /// Accepts the configuration key or the display name, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(s) || kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::validation(format!("unknown source '{s}'")))
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
