//! Metro/region groupings inside each province.

type RegionTable = &'static [(&'static str, &'static [&'static str])];

const REGIONS: &[(&str, RegionTable)] = &[
    (
        "GP",
        &[
            ("johannesburg", &["Johannesburg", "Sandton", "Randburg", "Roodepoort", "Soweto"]),
            ("pretoria", &["Pretoria", "Centurion", "Midrand", "Akasia"]),
            ("ekurhuleni", &["Alberton", "Kempton Park", "Boksburg", "Benoni", "Germiston"]),
        ],
    ),
    (
        "WC",
        &[
            ("cape_town", &["Cape Town", "Bellville", "Mitchells Plain", "Khayelitsha"]),
            ("winelands", &["Stellenbosch", "Paarl", "Franschhoek", "Wellington"]),
            ("garden_route", &["George", "Mossel Bay", "Knysna", "Plettenberg Bay"]),
        ],
    ),
    (
        "KZN",
        &[
            ("durban", &["Durban", "Umhlanga", "Pinetown", "Amanzimtoti"]),
            ("north_coast", &["Ballito", "Salt Rock", "Tongaat"]),
            ("south_coast", &["Scottburgh", "Port Shepstone", "Margate"]),
        ],
    ),
    (
        "EC",
        &[
            ("nelson_mandela_bay", &["Port Elizabeth", "Uitenhage", "Despatch"]),
            ("east_london", &["East London", "Mdantsane", "Cambridge"]),
            ("wild_coast", &["Mthatha", "Butterworth", "Idutywa"]),
        ],
    ),
    (
        "FS",
        &[
            ("mangaung", &["Bloemfontein", "Botshabelo", "Thaba Nchu"]),
            ("goldfields", &["Welkom", "Virginia", "Allanridge"]),
            ("northern_fs", &["Kroonstad", "Sasolburg", "Parys"]),
        ],
    ),
    (
        "MP",
        &[
            ("lowveld", &["Nelspruit", "White River", "Hazyview"]),
            ("highveld", &["Witbank", "Middleburg", "Secunda"]),
            ("south_west", &["Ermelo", "Piet Retief", "Amsterdam"]),
        ],
    ),
    (
        "NW",
        &[
            ("bojanala", &["Rustenburg", "Brits", "Thabazimbi"]),
            ("central", &["Mahikeng", "Lichtenburg", "Zeerust"]),
            ("southern", &["Potchefstroom", "Klerksdorp", "Stilfontein"]),
        ],
    ),
    (
        "LP",
        &[
            ("capricorn", &["Polokwane", "Mankweng", "Seshego"]),
            ("mopani", &["Tzaneen", "Giyani", "Phalaborwa"]),
            ("vhembe", &["Thohoyandou", "Makhado", "Musina"]),
        ],
    ),
    (
        "NC",
        &[
            ("diamond_fields", &["Kimberley", "Barkly West", "Warrenton"]),
            ("kalahari", &["Upington", "Kathu", "Kuruman"]),
            ("namaqualand", &["Springbok", "Pofadder", "Port Nolloth"]),
        ],
    ),
];

/// Region of a place within a province.
///
/// Matches case-insensitively when either name contains the other.
pub fn region_for(location: &str, province_code: &str) -> Option<&'static str> {
    let location = location.trim().to_lowercase();
    if location.is_empty() {
        return None;
    }

    let (_, regions) = REGIONS.iter().find(|(code, _)| *code == province_code)?;
    regions.iter().find_map(|(region, places)| {
        places
            .iter()
            .map(|p| p.to_lowercase())
            .any(|p| p.contains(&location) || location.contains(&p))
            .then_some(*region)
    })
}
