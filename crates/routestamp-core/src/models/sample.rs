use chrono::NaiveDate;

use crate::models::Country;

/// World regions offered when adding a country.
pub const REGIONS: &[&str] = &[
    "Africa",
    "Asia",
    "Europe",
    "North America",
    "South America",
    "Oceania",
];

struct SampleRow {
    id: &'static str,
    name: &'static str,
    code: &'static str,
    region: &'static str,
    visited: bool,
    visit_date: Option<(i32, u32, u32)>,
    notes: Option<&'static str>,
    rating: Option<u8>,
    cities: &'static [&'static str],
}

const SAMPLE_ROWS: &[SampleRow] = &[
    SampleRow {
        id: "1",
        name: "United States",
        code: "US",
        region: "North America",
        visited: true,
        visit_date: Some((2023, 6, 15)),
        notes: Some("Amazing road trip across the country"),
        rating: Some(5),
        cities: &["New York", "Los Angeles", "San Francisco", "Chicago"],
    },
    SampleRow {
        id: "2",
        name: "Japan",
        code: "JP",
        region: "Asia",
        visited: true,
        visit_date: Some((2023, 9, 20)),
        notes: Some("Incredible culture and food"),
        rating: Some(5),
        cities: &["Tokyo", "Kyoto", "Osaka"],
    },
    SampleRow {
        id: "3",
        name: "France",
        code: "FR",
        region: "Europe",
        visited: true,
        visit_date: Some((2022, 7, 10)),
        notes: Some("Beautiful architecture and wine"),
        rating: Some(4),
        cities: &["Paris", "Lyon", "Nice"],
    },
    SampleRow {
        id: "4",
        name: "Australia",
        code: "AU",
        region: "Oceania",
        visited: false,
        visit_date: None,
        notes: None,
        rating: None,
        cities: &[],
    },
    SampleRow {
        id: "5",
        name: "Brazil",
        code: "BR",
        region: "South America",
        visited: false,
        visit_date: None,
        notes: None,
        rating: None,
        cities: &[],
    },
    SampleRow {
        id: "6",
        name: "South Africa",
        code: "ZA",
        region: "Africa",
        visited: false,
        visit_date: None,
        notes: None,
        rating: None,
        cities: &[],
    },
    SampleRow {
        id: "7",
        name: "Canada",
        code: "CA",
        region: "North America",
        visited: true,
        visit_date: Some((2023, 3, 5)),
        notes: Some("Beautiful nature and friendly people"),
        rating: Some(4),
        cities: &["Toronto", "Vancouver", "Montreal"],
    },
    SampleRow {
        id: "8",
        name: "Italy",
        code: "IT",
        region: "Europe",
        visited: true,
        visit_date: Some((2022, 5, 12)),
        notes: Some("Amazing food and history"),
        rating: Some(5),
        cities: &["Rome", "Florence", "Venice", "Milan"],
    },
];

/// The fixed dataset used when nothing usable is persisted.
pub fn sample_countries() -> Vec<Country> {
    SAMPLE_ROWS
        .iter()
        .map(|row| Country {
            id: row.id.to_string(),
            name: row.name.to_string(),
            code: row.code.to_string(),
            region: row.region.to_string(),
            visited: row.visited,
            wishlist: false,
            home: false,
            visit_date: row
                .visit_date
                .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            notes: row.notes.map(str::to_string),
            rating: row.rating,
            cities: row.cities.iter().map(|c| c.to_string()).collect(),
        })
        .collect()
}
