//! Shared, concurrently readable location table.
//!
//! Readers take an `Arc` snapshot of the current table. Writers build a new
//! table under the write lock and swap it in, so a snapshot is always either
//! the table before an insert or the table after it.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::location::{LocationKind, ProvinceTable};
use crate::models::LocationConfig;

/// Substring patterns that place a new location in a province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceRule {
    pub province: String,
    /// Lowercase substrings matched against the lowercased location name
    pub patterns: Vec<String>,
}

impl ProvinceRule {
    pub fn new(province: &str, patterns: &[&str]) -> Self {
        Self {
            province: province.to_string(),
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    fn matches(&self, location_lower: &str) -> bool {
        self.patterns.iter().any(|p| location_lower.contains(p.as_str()))
    }
}

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvinceRules {
    rules: Vec<ProvinceRule>,
}

impl ProvinceRules {
    pub fn new(rules: Vec<ProvinceRule>) -> Self {
        Self { rules }
    }

    /// Patterns keyed on the major city names of each province.
    pub fn south_africa() -> Self {
        Self::new(vec![
            ProvinceRule::new("GP", &["johannesburg", "pretoria", "sandton", "randburg", "roodepoort"]),
            ProvinceRule::new("WC", &["cape town", "stellenbosch", "paarl", "somerset"]),
            ProvinceRule::new("KZN", &["durban", "pietermaritzburg", "umhlanga", "ballito"]),
            ProvinceRule::new("EC", &["port elizabeth", "gqeberha", "east london", "mthatha"]),
            ProvinceRule::new("FS", &["bloemfontein", "welkom", "kroonstad"]),
            ProvinceRule::new("MP", &["nelspruit", "mbombela", "witbank", "emalahleni"]),
            ProvinceRule::new("NW", &["rustenburg", "potchefstroom", "mahikeng", "klerksdorp"]),
            ProvinceRule::new("LP", &["polokwane", "tzaneen", "thohoyandou"]),
            ProvinceRule::new("NC", &["kimberley", "upington", "springbok"]),
        ])
    }

    /// Province code suggested by the first matching rule.
    pub fn infer(&self, location: &str) -> Option<&str> {
        let lower = location.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.province.as_str())
    }

    pub fn rules(&self) -> &[ProvinceRule] {
        &self.rules
    }
}

/// Outcome of adding a custom location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedLocation {
    pub location: String,
    pub province_code: String,
    pub province_name: String,
    pub kind: LocationKind,
    /// False when the location was already known
    pub inserted: bool,
}

/// Owner of the province table.
#[derive(Debug)]
pub struct LocationRegistry {
    table: RwLock<Arc<ProvinceTable>>,
    rules: ProvinceRules,
    default_province: String,
    fallback_province: String,
}

impl LocationRegistry {
    /// Create a registry, checking that the configured provinces exist.
    pub fn new(table: ProvinceTable, rules: ProvinceRules, config: &LocationConfig) -> Result<Self> {
        for code in [&config.default_province, &config.fallback_province] {
            if table.province(code).is_none() {
                return Err(AppError::location(format!(
                    "configured province '{code}' is not in the table"
                )));
            }
        }
        if let Some(rule) = rules.rules().iter().find(|r| table.province(&r.province).is_none()) {
            return Err(AppError::location(format!(
                "rule targets unknown province '{}'",
                rule.province
            )));
        }

        Ok(Self {
            table: RwLock::new(Arc::new(table)),
            rules,
            default_province: config.default_province.clone(),
            fallback_province: config.fallback_province.clone(),
        })
    }

    /// Registry seeded with the South African provinces and rules.
    pub fn south_africa(config: &LocationConfig) -> Result<Self> {
        Self::new(ProvinceTable::south_africa(), ProvinceRules::south_africa(), config)
    }

    /// Current table. Later inserts do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<ProvinceTable> {
        let guard = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// `(code, name)` of the province containing the exact place name.
    pub fn find_province(&self, location: &str) -> Option<(String, String)> {
        self.snapshot()
            .find_province(location)
            .map(|p| (p.code.clone(), p.name.clone()))
    }

    pub fn all_locations(&self) -> Vec<String> {
        self.snapshot().all_locations()
    }

    /// Province assigned to unmatched posting locations.
    pub fn fallback_province(&self) -> &str {
        &self.fallback_province
    }

    /// Insert a new place, inferring its province from the rule table.
    pub fn add_custom_location(&self, location: &str, kind: LocationKind) -> Result<AddedLocation> {
        let location = location.split_whitespace().collect::<Vec<_>>().join(" ");
        if location.is_empty() {
            return Err(AppError::location("location name is empty"));
        }

        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = guard.find_province(&location) {
            return Ok(AddedLocation {
                province_code: existing.code.clone(),
                province_name: existing.name.clone(),
                location,
                kind,
                inserted: false,
            });
        }

        let code = self
            .rules
            .infer(&location)
            .unwrap_or(&self.default_province)
            .to_string();

        let mut next = ProvinceTable::clone(&guard);
        next.insert(&code, &location, kind)?;
        let province_name = next
            .province(&code)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        *guard = Arc::new(next);

        log::info!("Added {kind} '{location}' to {province_name} ({code})");

        Ok(AddedLocation {
            location,
            province_code: code,
            province_name,
            kind,
            inserted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn registry() -> LocationRegistry {
        LocationRegistry::south_africa(&LocationConfig::default()).unwrap()
    }

    #[test]
    fn find_province_by_exact_name() {
        let registry = registry();
        assert_eq!(
            registry.find_province("Sandton"),
            Some(("GP".to_string(), "Gauteng".to_string()))
        );
        assert_eq!(registry.find_province("Nowhereville"), None);
    }

    #[test]
    fn rules_pick_first_match() {
        let rules = ProvinceRules::south_africa();
        assert_eq!(rules.infer("North Durban Industrial"), Some("KZN"));
        assert_eq!(rules.infer("Somerset Mall"), Some("WC"));
        assert_eq!(rules.infer("Nowhereville"), None);
    }

    #[test]
    fn add_location_uses_rule_table() {
        let registry = registry();
        let added = registry
            .add_custom_location("Cape Town CBD", LocationKind::Town)
            .unwrap();
        assert!(added.inserted);
        assert_eq!(added.province_code, "WC");
        assert_eq!(added.province_name, "Western Cape");
        assert_eq!(
            registry.find_province("Cape Town CBD"),
            Some(("WC".to_string(), "Western Cape".to_string()))
        );
    }

    #[test]
    fn add_location_defaults_province() {
        let config = LocationConfig {
            default_province: "FS".to_string(),
            ..LocationConfig::default()
        };
        let registry = LocationRegistry::south_africa(&config).unwrap();
        let added = registry
            .add_custom_location("Nowhereville", LocationKind::Village)
            .unwrap();
        assert_eq!(added.province_code, "FS");
        let table = registry.snapshot();
        assert!(table.province("FS").unwrap().villages.contains(&"Nowhereville".to_string()));
    }

    #[test]
    fn add_known_location_is_noop() {
        let registry = registry();
        let before = registry.snapshot();
        let added = registry
            .add_custom_location("Durban", LocationKind::Town)
            .unwrap();
        assert!(!added.inserted);
        assert_eq!(added.province_code, "KZN");
        assert_eq!(*registry.snapshot(), *before);
    }

    #[test]
    fn add_empty_location_fails() {
        assert!(registry().add_custom_location("   ", LocationKind::Town).is_err());
    }

    #[test]
    fn snapshot_is_isolated_from_later_inserts() {
        let registry = registry();
        let before = registry.snapshot();
        registry
            .add_custom_location("Pretoria East", LocationKind::Town)
            .unwrap();
        assert!(before.find_province("Pretoria East").is_none());
        assert!(registry.snapshot().find_province("Pretoria East").is_some());
    }

    #[test]
    fn rejects_unknown_configured_province() {
        let config = LocationConfig {
            fallback_province: "XX".to_string(),
            ..LocationConfig::default()
        };
        assert!(LocationRegistry::south_africa(&config).is_err());
    }

    #[test]
    fn concurrent_inserts_and_reads() {
        let registry = Arc::new(registry());
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .add_custom_location(&format!("Johannesburg Suburb {i}"), LocationKind::Town)
                        .unwrap();
                })
            })
            .collect();
        let readers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let table = registry.snapshot();
                        let towns = &table.province("GP").unwrap().towns;
                        let mut sorted = towns.clone();
                        sorted.sort();
                        assert_eq!(*towns, sorted);
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        let table = registry.snapshot();
        let towns = &table.province("GP").unwrap().towns;
        assert_eq!(
            towns.iter().filter(|t| t.starts_with("Johannesburg Suburb")).count(),
            8
        );
    }
}
