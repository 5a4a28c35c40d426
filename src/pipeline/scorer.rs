// src/pipeline/scorer.rs

//! Five-factor match scoring.
//!
//! Each factor yields a sub-score in [0, 1]. The final score is the weighted
//! sum scaled to 0-100 and rounded to two decimals.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::location::ProvinceTable;
use crate::models::{CandidateProfile, MatchBreakdown, MatchResult, NormalizedPosting};
use crate::pipeline::normalize::{dedup_key, resolve_place};

pub const SKILLS_WEIGHT: f64 = 0.40;
pub const EXPERIENCE_WEIGHT: f64 = 0.20;
pub const LOCATION_WEIGHT: f64 = 0.15;
pub const SALARY_WEIGHT: f64 = 0.15;
pub const EDUCATION_WEIGHT: f64 = 0.10;

/// Skills recognized in posting text, with their importance.
const SKILL_VOCABULARY: &[(&str, f64)] = &[
    ("python", 1.2),
    ("java", 1.1),
    ("javascript", 1.1),
    ("typescript", 1.0),
    ("react", 1.3),
    ("angular", 1.0),
    ("vue", 1.0),
    ("node.js", 1.2),
    ("django", 1.0),
    ("flask", 1.0),
    ("c#", 1.0),
    ("c++", 1.0),
    (".net", 1.0),
    ("php", 1.0),
    ("ruby", 1.0),
    ("go", 1.0),
    ("rust", 1.0),
    ("sql", 1.0),
    ("postgresql", 1.0),
    ("mongodb", 1.0),
    ("html", 1.0),
    ("css", 1.0),
    ("aws", 1.4),
    ("azure", 1.0),
    ("gcp", 1.0),
    ("docker", 1.3),
    ("kubernetes", 1.4),
    ("terraform", 1.0),
    ("linux", 1.0),
    ("git", 1.0),
    ("devops", 1.0),
    ("machine learning", 1.5),
    ("ai", 1.5),
    ("data science", 1.4),
    ("data analysis", 1.0),
    ("tensorflow", 1.0),
    ("pytorch", 1.0),
    ("excel", 1.0),
    ("power bi", 1.0),
    ("tableau", 1.0),
    ("project management", 1.2),
    ("agile", 1.1),
    ("scrum", 1.1),
    ("communication", 1.0),
    ("leadership", 1.0),
];

/// Importance of a skill; 1.0 for anything without a tuned weight.
pub fn skill_importance(skill: &str) -> f64 {
    SKILL_VOCABULARY
        .iter()
        .find(|(name, _)| *name == skill)
        .map_or(1.0, |(_, weight)| *weight)
}

/// Vocabulary skills mentioned in `text`.
pub fn extract_skills(text: &str) -> BTreeSet<String> {
    let text = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|(skill, _)| contains_token(&text, skill))
        .map(|(skill, _)| skill.to_string())
        .collect()
}

/// `needle` occurs in `haystack` with no alphanumeric character on either side.
fn contains_token(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

static EXPERIENCE_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:\+|(?:-|to)\s*\d+)?\s*(?:years?|yrs?)\b")
        .expect("experience pattern is valid")
});

/// Years of experience a description asks for.
pub fn required_experience(description: &str) -> Option<f64> {
    EXPERIENCE_YEARS
        .captures(description)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|years| *years > 0.0)
}

const EDUCATION_KEYWORDS: &[(EducationLevel, &[&str])] = &[
    (EducationLevel::NoFormal, &["no formal education", "none"]),
    (EducationLevel::Matric, &["matric", "grade 12", "nsc", "high school"]),
    (EducationLevel::Certificate, &["certificate", "higher certificate"]),
    (EducationLevel::Diploma, &["diploma", "national diploma"]),
    (
        EducationLevel::Bachelor,
        &["bachelor", "bachelors", "degree", "bsc", "b.sc", "bcom", "b.com", "btech", "ba"],
    ),
    (EducationLevel::Honours, &["honours", "honors", "hons"]),
    (EducationLevel::Master, &["master", "masters", "msc", "m.sc", "mba", "mcom"]),
    (EducationLevel::Doctorate, &["phd", "ph.d", "doctorate", "doctoral"]),
];

/// Education levels in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EducationLevel {
    NoFormal,
    Matric,
    Certificate,
    Diploma,
    Bachelor,
    Honours,
    Master,
    Doctorate,
}

impl EducationLevel {
    /// Every level mentioned in `text`, ascending.
    pub fn mentioned(text: &str) -> Vec<EducationLevel> {
        let text = text.to_lowercase();
        EDUCATION_KEYWORDS
            .iter()
            .filter(|(_, words)| words.iter().any(|w| contains_token(&text, w)))
            .map(|(level, _)| *level)
            .collect()
    }

    /// Lowest level a posting mentions; `none` is never a requirement.
    pub fn required(description: &str) -> Option<EducationLevel> {
        Self::mentioned(description)
            .into_iter()
            .find(|level| *level != Self::NoFormal)
    }

    /// Highest level a candidate holds.
    pub fn held(education: &str) -> Option<EducationLevel> {
        Self::mentioned(education).into_iter().max()
    }

    fn rank(self) -> i32 {
        self as i32
    }
}

/// Scores postings against a candidate profile.
///
/// Province comparisons use the table snapshot taken at construction, so a
/// scorer gives the same answer for the same inputs regardless of concurrent
/// location edits.
#[derive(Debug, Clone)]
pub struct Scorer {
    table: Arc<ProvinceTable>,
}

impl Scorer {
    pub fn new(table: Arc<ProvinceTable>) -> Self {
        Self { table }
    }

    pub fn score(&self, posting: &NormalizedPosting, profile: &CandidateProfile) -> MatchResult {
        let breakdown = MatchBreakdown {
            skills: self.skills_score(posting, profile),
            experience: self.experience_score(posting, profile),
            location: self.location_score(posting, profile),
            salary: self.salary_score(posting, profile),
            education: self.education_score(posting, profile),
        };

        let total = SKILLS_WEIGHT * breakdown.skills
            + EXPERIENCE_WEIGHT * breakdown.experience
            + LOCATION_WEIGHT * breakdown.location
            + SALARY_WEIGHT * breakdown.salary
            + EDUCATION_WEIGHT * breakdown.education;
        let match_score = ((total * 100.0).clamp(0.0, 100.0) * 100.0).round() / 100.0;

        MatchResult {
            id: fingerprint(posting),
            posting: posting.clone(),
            match_score,
            match_breakdown: breakdown,
        }
    }

    pub fn skills_score(&self, posting: &NormalizedPosting, profile: &CandidateProfile) -> f64 {
        let text = format!("{} {}", posting.posting.title, posting.posting.description);
        let posting_skills = extract_skills(&text);
        if posting_skills.is_empty() || profile.skills.is_empty() {
            return 0.5;
        }

        let total: f64 = posting_skills.iter().map(|s| skill_importance(s)).sum();
        let matched: f64 = posting_skills
            .iter()
            .filter(|s| profile.skills.contains(*s))
            .map(|s| skill_importance(s))
            .sum();
        matched / total
    }

    pub fn experience_score(&self, posting: &NormalizedPosting, profile: &CandidateProfile) -> f64 {
        let Some(required) = required_experience(&posting.posting.description) else {
            return 0.8;
        };

        let years = profile.years_experience;
        if years >= required {
            1.0
        } else if years >= required * 0.7 {
            0.7
        } else {
            0.3
        }
    }

    pub fn location_score(&self, posting: &NormalizedPosting, profile: &CandidateProfile) -> f64 {
        let location = posting.posting.location.trim();
        let preferred: Vec<&str> = profile
            .preferred_locations
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        if location.is_empty() || preferred.is_empty() {
            return 0.6;
        }

        if preferred.iter().any(|p| p.eq_ignore_ascii_case(location)) {
            return 1.0;
        }

        let posting_province = resolve_place(&self.table, location).map(|(_, p)| p.code.as_str());
        if let Some(code) = posting_province {
            let same_province = preferred.iter().any(|p| {
                resolve_place(&self.table, p).is_some_and(|(_, province)| province.code == code)
            });
            if same_province {
                return 0.8;
            }
        }

        let remote = posting.posting.is_remote_capable()
            || location.to_lowercase().contains("remote")
            || posting.posting.description.to_lowercase().contains("work from home");
        if remote {
            return 0.9;
        }

        0.2
    }

    pub fn salary_score(&self, posting: &NormalizedPosting, profile: &CandidateProfile) -> f64 {
        let offered = posting.salary_value;
        let expected = profile.expected_salary;
        if offered <= 0.0 || expected <= 0.0 {
            return 0.7;
        }
        if offered >= expected {
            1.0
        } else {
            (offered / expected).max(0.0)
        }
    }

    pub fn education_score(&self, posting: &NormalizedPosting, profile: &CandidateProfile) -> f64 {
        let required = EducationLevel::required(&posting.posting.description);
        let held = EducationLevel::held(&profile.education);
        let (Some(required), Some(held)) = (required, held) else {
            return 0.8;
        };

        match required.rank() - held.rank() {
            gap if gap <= 0 => 1.0,
            1 => 0.6,
            _ => 0.3,
        }
    }
}

/// Stable id for a posting.
pub fn fingerprint(posting: &NormalizedPosting) -> String {
    hex::encode(Sha256::digest(dedup_key(posting).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalLocation, Posting, SourceKind};

    fn scorer() -> Scorer {
        Scorer::new(Arc::new(ProvinceTable::south_africa()))
    }

    fn normalized(posting: Posting) -> NormalizedPosting {
        NormalizedPosting {
            posting,
            salary_value: 0.0,
            canonical_location: CanonicalLocation::default(),
            posted_on: None,
        }
    }

    fn posting(title: &str, description: &str) -> NormalizedPosting {
        let mut posting = Posting::new(SourceKind::PNet, title, "Acme");
        posting.description = description.to_string();
        normalized(posting)
    }

    fn profile(skills: &[&str], years: f64) -> CandidateProfile {
        CandidateProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            years_experience: years,
            preferred_locations: Vec::new(),
            expected_salary: 0.0,
            education: String::new(),
        }
    }

    #[test]
    fn worked_example_scores_92() {
        let mut raw = Posting::new(SourceKind::RemoteOk, "Python Developer", "Northwind");
        raw.description = "3 years experience required, remote friendly".to_string();
        raw.location = "Remote".to_string();
        raw.remote = true;
        let posting = normalized(raw);

        let mut profile = profile(&["python", "aws"], 5.0);
        profile.preferred_locations = vec!["Cape Town".to_string()];

        let result = scorer().score(&posting, &profile);
        assert_eq!(
            result.match_breakdown,
            MatchBreakdown {
                skills: 1.0,
                experience: 1.0,
                location: 0.9,
                salary: 0.7,
                education: 0.8,
            }
        );
        assert_eq!(result.match_score, 92.0);
        assert_eq!(result.id.len(), 64);
    }

    #[test]
    fn skills_neutral_when_either_side_empty() {
        let scorer = scorer();
        let no_skills = posting("Office Assistant", "Answer phones");
        assert_eq!(scorer.skills_score(&no_skills, &profile(&["python"], 1.0)), 0.5);

        let with_skills = posting("Python Developer", "");
        assert_eq!(scorer.skills_score(&with_skills, &profile(&[], 1.0)), 0.5);
    }

    #[test]
    fn skills_weighted_by_importance() {
        let posting = posting("Engineer", "Python and AWS and Excel");
        let score = scorer().skills_score(&posting, &profile(&["python", "excel"], 1.0));
        let expected = (1.2 + 1.0) / (1.2 + 1.4 + 1.0);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn skill_matches_are_token_bounded() {
        let skills = extract_skills("Maintain Java services; javascript a plus. Node.js, C# and AI.");
        assert!(skills.contains("java"));
        assert!(skills.contains("javascript"));
        assert!(skills.contains("node.js"));
        assert!(skills.contains("c#"));
        assert!(skills.contains("ai"));

        let skills = extract_skills("Maintain and gather requirements");
        assert!(!skills.contains("ai"));
        assert!(!skills.contains("go"));
    }

    #[test]
    fn experience_tiers() {
        let scorer = scorer();
        let post = posting("Dev", "Minimum 5+ yrs in a similar role");
        assert_eq!(scorer.experience_score(&post, &profile(&[], 6.0)), 1.0);
        assert_eq!(scorer.experience_score(&post, &profile(&[], 4.0)), 0.7);
        assert_eq!(scorer.experience_score(&post, &profile(&[], 2.0)), 0.3);

        let range = posting("Dev", "3-5 years experience");
        assert_eq!(required_experience(&range.posting.description), Some(3.0));

        let none = posting("Dev", "Graduates welcome");
        assert_eq!(scorer.experience_score(&none, &profile(&[], 0.0)), 0.8);
    }

    #[test]
    fn location_order() {
        let scorer = scorer();
        let at = |location: &str, remote: bool| {
            let mut raw = Posting::new(SourceKind::PNet, "Dev", "Acme");
            raw.location = location.to_string();
            raw.remote = remote;
            normalized(raw)
        };
        let mut candidate = profile(&[], 0.0);
        candidate.preferred_locations = vec!["Johannesburg".to_string()];

        assert_eq!(scorer.location_score(&at("johannesburg", false), &candidate), 1.0);
        assert_eq!(scorer.location_score(&at("Sandton", true), &candidate), 0.8);
        assert_eq!(scorer.location_score(&at("Durban", true), &candidate), 0.9);
        assert_eq!(scorer.location_score(&at("Durban", false), &candidate), 0.2);
        assert_eq!(scorer.location_score(&at("", false), &candidate), 0.6);

        candidate.preferred_locations.clear();
        assert_eq!(scorer.location_score(&at("Durban", false), &candidate), 0.6);
    }

    #[test]
    fn salary_ratio() {
        let scorer = scorer();
        let mut post = posting("Dev", "");
        let mut candidate = profile(&[], 0.0);
        assert_eq!(scorer.salary_score(&post, &candidate), 0.7);

        post.salary_value = 40_000.0;
        candidate.expected_salary = 50_000.0;
        assert!((scorer.salary_score(&post, &candidate) - 0.8).abs() < 1e-9);

        post.salary_value = 60_000.0;
        assert_eq!(scorer.salary_score(&post, &candidate), 1.0);
    }

    #[test]
    fn education_tiers() {
        let scorer = scorer();
        let post = posting("Dev", "A bachelor's degree or diploma in IT");
        let holding = |education: &str| {
            let mut candidate = profile(&[], 0.0);
            candidate.education = education.to_string();
            candidate
        };

        assert_eq!(EducationLevel::required(&post.posting.description), Some(EducationLevel::Diploma));
        assert_eq!(scorer.education_score(&post, &holding("National Diploma")), 1.0);
        assert_eq!(scorer.education_score(&post, &holding("Higher Certificate")), 0.6);
        assert_eq!(scorer.education_score(&post, &holding("Matric")), 0.3);
        assert_eq!(scorer.education_score(&post, &holding("")), 0.8);

        let unspecified = posting("Dev", "Great team");
        assert_eq!(scorer.education_score(&unspecified, &holding("MSc")), 0.8);
    }

    #[test]
    fn scores_are_bounded_and_deterministic() {
        let scorer = scorer();
        let post = posting("Senior Python AWS Engineer", "10 years. PhD required. Docker, Kubernetes.");
        let candidate = profile(&["python"], 1.0);

        let first = scorer.score(&post, &candidate);
        let second = scorer.score(&post, &candidate);
        assert_eq!(first, second);
        assert!((0.0..=100.0).contains(&first.match_score));
    }
}
