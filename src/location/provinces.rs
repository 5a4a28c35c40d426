//! Province reference table.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Size class of a place inside a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    City,
    Town,
    Village,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocationKind::City => "city",
            LocationKind::Town => "town",
            LocationKind::Village => "village",
        })
    }
}

impl FromStr for LocationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "city" => Ok(LocationKind::City),
            "town" => Ok(LocationKind::Town),
            "village" => Ok(LocationKind::Village),
            other => Err(AppError::location(format!("unknown location kind '{other}'"))),
        }
    }
}

/// One province and its known places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    /// Province code (e.g. "GP")
    pub code: String,

    /// Display name (e.g. "Gauteng")
    pub name: String,

    pub cities: Vec<String>,
    pub towns: Vec<String>,
    pub villages: Vec<String>,
}

impl Province {
    fn new(code: &str, name: &str, cities: &[&str], towns: &[&str], villages: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            code: code.to_string(),
            name: name.to_string(),
            cities: owned(cities),
            towns: owned(towns),
            villages: owned(villages),
        }
    }

    /// Case-sensitive exact membership in any of the place lists.
    pub fn contains(&self, location: &str) -> bool {
        self.places().any(|place| place == location)
    }

    /// All places, cities first.
    pub fn places(&self) -> impl Iterator<Item = &str> {
        self.cities
            .iter()
            .chain(&self.towns)
            .chain(&self.villages)
            .map(String::as_str)
    }

    fn list_mut(&mut self, kind: LocationKind) -> &mut Vec<String> {
        match kind {
            LocationKind::City => &mut self.cities,
            LocationKind::Town => &mut self.towns,
            LocationKind::Village => &mut self.villages,
        }
    }

    fn dedup_and_sort(&mut self) {
        for list in [&mut self.cities, &mut self.towns, &mut self.villages] {
            let unique: BTreeSet<String> = list.drain(..).collect();
            list.extend(unique);
        }
    }
}

/// Province code → places mapping.
///
/// A place belongs to at most one province.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceTable {
    provinces: Vec<Province>,
}

impl ProvinceTable {
    pub fn new(provinces: Vec<Province>) -> Self {
        Self { provinces }
    }

    /// The nine South African provinces.
    pub fn south_africa() -> Self {
        Self::new(vec![
            Province::new(
                "GP",
                "Gauteng",
                &["Johannesburg", "Pretoria", "Sandton", "Randburg", "Roodepoort", "Centurion", "Midrand"],
                &["Alberton", "Kempton Park", "Boksburg", "Benoni", "Springs", "Germiston", "Vereeniging"],
                &["Irene", "Hartbeespoort", "Cullinan", "Bronkhorstspruit"],
            ),
            Province::new(
                "WC",
                "Western Cape",
                &["Cape Town", "Stellenbosch", "Paarl", "Worcester", "George", "Mossel Bay"],
                &["Somerset West", "Bellville", "Kuils River", "Parow", "Mitchells Plain", "Khayelitsha"],
                &["Hout Bay", "Simon's Town", "Strand", "Gordon's Bay", "Plettenberg Bay"],
            ),
            Province::new(
                "KZN",
                "KwaZulu-Natal",
                &["Durban", "Pietermaritzburg", "Richards Bay", "Newcastle", "Ladysmith"],
                &["Umhlanga", "Ballito", "Amanzimtoti", "Margate", "Scottburgh", "Port Shepstone"],
                &["Salt Rock", "Sheffield Beach", "Pennington", "Hibberdene"],
            ),
            Province::new(
                "EC",
                "Eastern Cape",
                &["Port Elizabeth", "East London", "Mthatha", "Graaff-Reinet"],
                &["Uitenhage", "Queenstown", "Grahamstown", "Butterworth", "Cradock"],
                &["St Francis Bay", "Jeffrey's Bay", "Port Alfred", "Hogsback"],
            ),
            Province::new(
                "FS",
                "Free State",
                &["Bloemfontein", "Welkom", "Bethlehem", "Kroonstad"],
                &["Sasolburg", "Virginia", "Harrismith", "Phuthaditjhaba"],
                &["Clarens", "Ficksburg", "Parys", "Rosendal"],
            ),
            Province::new(
                "MP",
                "Mpumalanga",
                &["Nelspruit", "Witbank", "Middleburg", "Secunda"],
                &["Barberton", "Pilgrim's Rest", "Hazyview", "Malelane"],
                &["Sabie", "Graskop", "Dullstroom", "Kaapsehoop"],
            ),
            Province::new(
                "NW",
                "North West",
                &["Mahikeng", "Potchefstroom", "Klerksdorp", "Rustenburg"],
                &["Brits", "Zeerust", "Wolmaransstad", "Vryburg"],
                &["Hartbeesfontein", "Coligny", "Groot Marico"],
            ),
            Province::new(
                "LP",
                "Limpopo",
                &["Polokwane", "Thohoyandou", "Tzaneen", "Lephalale"],
                &["Mokopane", "Bela-Bela", "Makhado", "Giyani"],
                &["Haenertsburg", "Modjadjiskloof", "Ofcolaco"],
            ),
            Province::new(
                "NC",
                "Northern Cape",
                &["Kimberley", "Upington", "Springbok", "De Aar"],
                &["Kuruman", "Kathu", "Postmasburg", "Pofadder"],
                &["Augrabies", "McGregor", "Noupoort"],
            ),
        ])
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn province(&self, code: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.code == code)
    }

    /// Province containing the exact place name.
    pub fn find_province(&self, location: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.contains(location))
    }

    /// Every known place, sorted and deduplicated.
    pub fn all_locations(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self.provinces.iter().flat_map(Province::places).collect();
        unique.into_iter().map(String::from).collect()
    }

    /// Insert a place into a province, then dedup and re-sort its lists.
    pub(crate) fn insert(&mut self, code: &str, location: &str, kind: LocationKind) -> Result<()> {
        let province = self
            .provinces
            .iter_mut()
            .find(|p| p.code == code)
            .ok_or_else(|| AppError::location(format!("unknown province code '{code}'")))?;
        province.list_mut(kind).push(location.to_string());
        province.dedup_and_sort();
        Ok(())
    }
}

impl Default for ProvinceTable {
    fn default() -> Self {
        Self::south_africa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_province_exact_match() {
        let table = ProvinceTable::south_africa();
        let province = table.find_province("Sandton").unwrap();
        assert_eq!((province.code.as_str(), province.name.as_str()), ("GP", "Gauteng"));

        assert_eq!(table.find_province("Hout Bay").unwrap().code, "WC");
        assert!(table.find_province("Nowhereville").is_none());
    }

    #[test]
    fn find_province_is_case_sensitive() {
        let table = ProvinceTable::south_africa();
        assert!(table.find_province("sandton").is_none());
        assert!(table.find_province(" Sandton").is_none());
    }

    #[test]
    fn places_belong_to_one_province() {
        let table = ProvinceTable::south_africa();
        for place in table.all_locations() {
            let owners = table
                .provinces()
                .iter()
                .filter(|p| p.contains(&place))
                .count();
            assert_eq!(owners, 1, "{place} listed in {owners} provinces");
        }
    }

    #[test]
    fn all_locations_sorted() {
        let locations = ProvinceTable::south_africa().all_locations();
        let mut sorted = locations.clone();
        sorted.sort();
        assert_eq!(locations, sorted);
        assert!(locations.contains(&"Kimberley".to_string()));
    }

    #[test]
    fn insert_sorts_and_dedups() {
        let mut table = ProvinceTable::south_africa();
        table.insert("GP", "Akasia", LocationKind::Town).unwrap();
        table.insert("GP", "Akasia", LocationKind::Town).unwrap();

        let towns = &table.province("GP").unwrap().towns;
        assert_eq!(towns.iter().filter(|t| *t == "Akasia").count(), 1);
        assert_eq!(towns.first().map(String::as_str), Some("Akasia"));
    }

    #[test]
    fn insert_into_unknown_province_fails() {
        let mut table = ProvinceTable::south_africa();
        assert!(table.insert("XX", "Atlantis", LocationKind::City).is_err());
    }

    #[test]
    fn location_kind_parses() {
        assert_eq!("Village".parse::<LocationKind>().unwrap(), LocationKind::Village);
        assert!("hamlet".parse::<LocationKind>().is_err());
    }
}
