// src/pipeline/normalize.rs

//! Canonical fields and deduplication.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Days, NaiveDate};
use regex::Regex;

use crate::location::{Province, ProvinceTable, region_for};
use crate::models::{CanonicalLocation, NormalizedPosting, Posting};

static SALARY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:[ ,\u{a0}]\d{3})+|\d+(?:\.\d+)?)\s*(k)?\b")
        .expect("salary pattern is valid")
});

static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\+?\s*(hour|day|week|month)s?\s+ago")
        .expect("relative date pattern is valid")
});

/// Numeric salary from free text.
///
/// Takes the first amount found; a `k` suffix multiplies by 1000.
/// Returns 0 when nothing parses.
pub fn parse_salary(text: &str) -> f64 {
    let Some(caps) = SALARY_AMOUNT.captures(text) else {
        return 0.0;
    };

    let digits: String = caps[1]
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let amount = digits.parse::<f64>().unwrap_or(0.0);

    if caps.get(2).is_some() {
        amount * 1000.0
    } else {
        amount
    }
}

/// Posting date from an ISO date, RFC 3339 timestamp or relative phrase.
pub fn parse_posted_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }

    let text = text.to_lowercase();

    if ["today", "just posted", "just now"]
        .iter()
        .any(|phrase| text.contains(phrase))
    {
        return Some(today);
    }
    if text.contains("yesterday") {
        return today.checked_sub_days(Days::new(1));
    }

    let caps = RELATIVE_DATE.captures(&text)?;
    let count: u64 = caps[1].parse().ok()?;
    let days = match &caps[2] {
        "hour" => 0,
        "day" => count,
        "week" => count * 7,
        _ => count * 30,
    };
    today.checked_sub_days(Days::new(days))
}

fn collapse(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Identity of a posting across sources.
pub fn dedup_key(posting: &NormalizedPosting) -> String {
    format!(
        "{}|{}|{}",
        collapse(&posting.posting.title),
        collapse(&posting.posting.company),
        collapse(&posting.canonical_location.place)
    )
}

/// Drop duplicate postings.
///
/// The survivor keeps the first-seen slot. A duplicate replaces it only when
/// the survivor has no description and the duplicate does.
pub fn dedup(postings: Vec<NormalizedPosting>) -> Vec<NormalizedPosting> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<NormalizedPosting> = Vec::with_capacity(postings.len());

    for posting in postings {
        let key = dedup_key(&posting);
        match slots.get(&key) {
            Some(&slot) => {
                let current = &kept[slot].posting.description;
                if current.trim().is_empty() && !posting.posting.description.trim().is_empty() {
                    kept[slot] = posting;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(posting);
            }
        }
    }

    kept
}

/// Computes canonical fields against a province table snapshot.
pub struct Normalizer {
    table: Arc<ProvinceTable>,
    fallback_code: String,
    fallback_name: String,
    today: NaiveDate,
}

impl Normalizer {
    pub fn new(table: Arc<ProvinceTable>, fallback_province: &str, today: NaiveDate) -> Self {
        let fallback_name = table
            .province(fallback_province)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| fallback_province.to_string());

        Self {
            table,
            fallback_code: fallback_province.to_string(),
            fallback_name,
            today,
        }
    }

    pub fn normalize(&self, posting: Posting) -> NormalizedPosting {
        let salary_value = parse_salary(&posting.salary);
        let canonical_location = self.canonical_location(&posting.location);
        let posted_on = posting
            .posted_date
            .as_deref()
            .and_then(|d| parse_posted_date(d, self.today));

        NormalizedPosting {
            posting,
            salary_value,
            canonical_location,
            posted_on,
        }
    }

    /// Resolve a raw location string against the table.
    ///
    /// Tries the whole string, then each comma or slash separated segment.
    pub fn canonical_location(&self, raw: &str) -> CanonicalLocation {
        match resolve_place(&self.table, raw) {
            Some((place, province)) => CanonicalLocation {
                region: region_for(place, &province.code).map(String::from),
                place: place.to_string(),
                province_code: province.code.clone(),
                province_name: province.name.clone(),
                resolved: true,
            },
            None => CanonicalLocation {
                place: raw.split_whitespace().collect::<Vec<_>>().join(" "),
                province_code: self.fallback_code.clone(),
                province_name: self.fallback_name.clone(),
                region: None,
                resolved: false,
            },
        }
    }
}

/// Known place and its province for a raw location string.
pub(crate) fn resolve_place<'a, 'r>(
    table: &'a ProvinceTable,
    raw: &'r str,
) -> Option<(&'r str, &'a Province)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(province) = table.find_province(trimmed) {
        return Some((trimmed, province));
    }

    trimmed
        .split([',', '/'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .find_map(|segment| table.find_province(segment).map(|p| (segment, p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(Arc::new(ProvinceTable::south_africa()), "GP", today())
    }

    fn posting(title: &str, company: &str, location: &str, description: &str) -> Posting {
        let mut posting = Posting::new(SourceKind::PNet, title, company);
        posting.location = location.to_string();
        posting.description = description.to_string();
        posting
    }

    #[test]
    fn salary_formats() {
        assert_eq!(parse_salary("R 45 000 - R 55 000 per month"), 45_000.0);
        assert_eq!(parse_salary("R45k"), 45_000.0);
        assert_eq!(parse_salary("$120,000"), 120_000.0);
        assert_eq!(parse_salary("R 350 per hour"), 350.0);
        assert_eq!(parse_salary("Market related"), 0.0);
        assert_eq!(parse_salary(""), 0.0);
    }

    #[test]
    fn posted_dates() {
        let today = today();
        assert_eq!(
            parse_posted_date("2025-03-14", today),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        assert_eq!(
            parse_posted_date("2025-03-10T08:00:00+00:00", today),
            NaiveDate::from_ymd_opt(2025, 3, 10)
        );
        assert_eq!(parse_posted_date("Posted today", today), Some(today));
        assert_eq!(
            parse_posted_date("Yesterday", today),
            NaiveDate::from_ymd_opt(2025, 3, 19)
        );
        assert_eq!(
            parse_posted_date("3 days ago", today),
            NaiveDate::from_ymd_opt(2025, 3, 17)
        );
        assert_eq!(
            parse_posted_date("30+ days ago", today),
            NaiveDate::from_ymd_opt(2025, 2, 18)
        );
        assert_eq!(parse_posted_date("sometime", today), None);
    }

    #[test]
    fn resolves_known_locations() {
        let normalizer = normalizer();

        let sandton = normalizer.canonical_location(" Sandton ");
        assert!(sandton.resolved);
        assert_eq!(sandton.place, "Sandton");
        assert_eq!(sandton.province_code, "GP");
        assert_eq!(sandton.province_name, "Gauteng");
        assert_eq!(sandton.region.as_deref(), Some("johannesburg"));

        let segmented = normalizer.canonical_location("Cape Town, Western Cape");
        assert!(segmented.resolved);
        assert_eq!(segmented.place, "Cape Town");
        assert_eq!(segmented.province_code, "WC");

        let slashed = normalizer.canonical_location("Remote / Durban");
        assert_eq!(slashed.place, "Durban");
        assert_eq!(slashed.province_code, "KZN");
    }

    #[test]
    fn unknown_location_gets_fallback() {
        let location = normalizer().canonical_location("Nowhereville");
        assert!(!location.resolved);
        assert_eq!(location.place, "Nowhereville");
        assert_eq!(location.province_code, "GP");
        assert_eq!(location.province_name, "Gauteng");
        assert!(location.region.is_none());
    }

    #[test]
    fn normalize_fills_canonical_fields() {
        let mut raw = posting("Data Analyst", "Acme", "Sandton", "");
        raw.salary = "R45k".to_string();
        raw.posted_date = Some("2 days ago".to_string());

        let normalized = normalizer().normalize(raw);
        assert_eq!(normalized.salary_value, 45_000.0);
        assert_eq!(normalized.canonical_location.province_code, "GP");
        assert_eq!(normalized.posted_on, NaiveDate::from_ymd_opt(2025, 3, 18));
    }

    #[test]
    fn dedup_prefers_description_and_keeps_slot() {
        let normalizer = normalizer();
        let postings = vec![
            normalizer.normalize(posting("Data Analyst", "Acme", "Sandton", "")),
            normalizer.normalize(posting("Rust Engineer", "Ferrous", "Durban", "async")),
            normalizer.normalize(posting("data  analyst", "ACME", "Sandton", "Full details")),
            normalizer.normalize(posting("Data Analyst", "Acme", "Sandton", "Later copy")),
        ];

        let deduped = dedup(postings);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].posting.description, "Full details");
        assert_eq!(deduped[1].posting.title, "Rust Engineer");
    }

    #[test]
    fn dedup_is_idempotent() {
        let normalizer = normalizer();
        let postings = vec![
            normalizer.normalize(posting("A", "X", "Sandton", "")),
            normalizer.normalize(posting("A", "X", "Sandton", "desc")),
            normalizer.normalize(posting("B", "Y", "Pretoria", "")),
            normalizer.normalize(posting("A", "X", "Pretoria", "")),
        ];

        let once = dedup(postings);
        let twice = dedup(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
