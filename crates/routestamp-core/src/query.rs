//! Derived, read-only views over a country collection.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::models::Country;

// ─── Statistics ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryStats {
    pub total: usize,
    pub visited: usize,
    pub wishlist: usize,
    pub home: usize,
    /// Neither visited nor home.
    pub not_visited: usize,
    pub progress_percentage: f64,
    /// Distinct regions, sorted.
    pub regions: Vec<String>,
    /// Distinct regions with at least one visited country, sorted.
    pub regions_visited: Vec<String>,
}

impl CountryStats {
    pub fn compute(countries: &[Country]) -> Self {
        let total = countries.len();
        let visited = countries.iter().filter(|c| c.visited).count();
        let wishlist = countries.iter().filter(|c| c.wishlist).count();
        let home = countries.iter().filter(|c| c.home).count();
        let not_visited = countries.iter().filter(|c| !c.visited && !c.home).count();

        let progress_percentage = if total > 0 {
            visited as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total,
            visited,
            wishlist,
            home,
            not_visited,
            progress_percentage,
            regions: distinct_regions(countries.iter()),
            regions_visited: distinct_regions(countries.iter().filter(|c| c.visited)),
        }
    }
}

fn distinct_regions<'a>(countries: impl Iterator<Item = &'a Country>) -> Vec<String> {
    countries
        .map(|c| c.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionShare {
    pub region: String,
    pub count: usize,
    /// Share of all visited countries.
    pub percentage: f64,
}

/// Visited-country counts per region.
pub fn region_breakdown(countries: &[Country]) -> Vec<RegionShare> {
    let visited: Vec<&Country> = countries.iter().filter(|c| c.visited).collect();
    if visited.is_empty() {
        return Vec::new();
    }

    distinct_regions(visited.iter().copied())
        .into_iter()
        .map(|region| {
            let count = visited.iter().filter(|c| c.region == region).count();
            RegionShare {
                percentage: count as f64 / visited.len() as f64 * 100.0,
                region,
                count,
            }
        })
        .collect()
}

/// Highest-rated visited countries.
pub fn top_rated(countries: &[Country], limit: usize) -> Vec<Country> {
    let mut rated: Vec<Country> = countries
        .iter()
        .filter(|c| c.visited && c.rating.is_some())
        .cloned()
        .collect();
    rated.sort_by(|a, b| b.rating.cmp(&a.rating));
    rated.truncate(limit);
    rated
}

/// Visited countries with a date, most recent first.
pub fn timeline(countries: &[Country], limit: usize) -> Vec<Country> {
    let mut dated: Vec<Country> = countries
        .iter()
        .filter(|c| c.visited && c.visit_date.is_some())
        .cloned()
        .collect();
    dated.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
    dated.truncate(limit);
    dated
}

// ─── Filtering ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFilter {
    /// Case-insensitive substring matched against name or code.
    pub search: String,
    /// `None` matches every region.
    pub region: Option<String>,
    /// `None` matches both visited and unvisited.
    pub visited: Option<bool>,
}

impl CountryFilter {
    pub fn matches(&self, country: &Country) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = country.name.to_lowercase().contains(&needle)
            || country.code.to_lowercase().contains(&needle);
        let matches_region = self
            .region
            .as_ref()
            .is_none_or(|region| &country.region == region);
        let matches_visited = self.visited.is_none_or(|v| country.visited == v);

        matches_search && matches_region && matches_visited
    }

    pub fn apply(&self, countries: &[Country]) -> Vec<Country> {
        countries.iter().filter(|c| self.matches(c)).cloned().collect()
    }
}

// ─── Sorting ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    VisitDate,
    DateAdded,
    Rating,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::VisitDate => "visit date",
            Self::DateAdded => "date added",
            Self::Rating => "rating",
        }
    }

    /// Name as written in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::VisitDate => "visit_date",
            Self::DateAdded => "date_added",
            Self::Rating => "rating",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "visit_date" | "visitDate" | "date" => Ok(Self::VisitDate),
            "date_added" | "dateAdded" | "added" => Ok(Self::DateAdded),
            "rating" => Ok(Self::Rating),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Insertion-order key recovered from an id: ULIDs decode to their 128-bit
/// value (timestamp in the high bits), plain numeric ids parse directly,
/// anything else is 0.
pub fn insertion_key(id: &str) -> u128 {
    if let Ok(ulid) = Ulid::from_string(id) {
        return u128::from(ulid);
    }
    id.parse::<u128>().unwrap_or(0)
}

fn visit_timestamp(country: &Country) -> i64 {
    country
        .visit_date
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
        .unwrap_or(0)
}

fn compare(a: &Country, b: &Country, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::VisitDate => visit_timestamp(a).cmp(&visit_timestamp(b)),
        SortKey::DateAdded => insertion_key(&a.id).cmp(&insertion_key(&b.id)),
        SortKey::Rating => a.rating.unwrap_or(0).cmp(&b.rating.unwrap_or(0)),
    }
}

/// Stable in-place sort. Equal keys keep their input order in both directions.
pub fn sort_countries(countries: &mut [Country], key: SortKey, order: SortOrder) {
    countries.sort_by(|a, b| match order {
        SortOrder::Asc => compare(a, b, key),
        SortOrder::Desc => compare(b, a, key),
    });
}

pub fn filter_and_sort(
    countries: &[Country],
    filter: &CountryFilter,
    key: SortKey,
    order: SortOrder,
) -> Vec<Country> {
    let mut out = filter.apply(countries);
    sort_countries(&mut out, key, order);
    out
}
