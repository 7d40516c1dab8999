use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Country ───────────────────────────────────────────────

/// A tracked country, the record type held by [`CountryStore`](crate::CountryStore).
///
/// Status flags are independent booleans. The UI presents them as a single
/// radio choice, see [`Country::status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
    pub region: String,
    pub visited: bool,

    #[serde(default)]
    pub wishlist: bool,

    #[serde(default)]
    pub home: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDate>,

    /// 1–5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub cities: Vec<String>,
}

impl Country {
    /// Build a record from user input and an already-assigned id.
    pub fn from_new(id: impl Into<String>, new: NewCountry) -> Self {
        Self {
            id: id.into(),
            name: new.name,
            code: new.code,
            region: new.region,
            visited: new.visited,
            wishlist: new.wishlist,
            home: new.home,
            visit_date: new.visit_date,
            rating: new.rating,
            notes: new.notes,
            cities: new.cities,
        }
    }

    /// The radio-style status shown to the user. `home` wins over `visited`,
    /// which wins over `wishlist`.
    pub fn status(&self) -> CountryStatus {
        if self.home {
            CountryStatus::Home
        } else if self.visited {
            CountryStatus::Visited
        } else if self.wishlist {
            CountryStatus::Wishlist
        } else {
            CountryStatus::None
        }
    }

    /// Set all three flags from a single radio choice.
    pub fn set_status(&mut self, status: CountryStatus) {
        self.visited = status == CountryStatus::Visited;
        self.wishlist = status == CountryStatus::Wishlist;
        self.home = status == CountryStatus::Home;
    }

    /// Apply one typed field change in place.
    pub fn apply_change(&mut self, change: &CountryChange) {
        match change {
            CountryChange::Name(name) => self.name = name.clone(),
            CountryChange::Code(code) => self.code = code.clone(),
            CountryChange::Region(region) => self.region = region.clone(),
            CountryChange::Visited(v) => self.visited = *v,
            CountryChange::Wishlist(v) => self.wishlist = *v,
            CountryChange::Home(v) => self.home = *v,
            CountryChange::Status(status) => self.set_status(*status),
            CountryChange::VisitDate(date) => self.visit_date = *date,
            CountryChange::Rating(rating) => self.rating = *rating,
            CountryChange::Notes(notes) => self.notes = notes.clone(),
            CountryChange::Cities(cities) => self.cities = cities.clone(),
        }
    }
}

/// User-supplied fields for a new country; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCountry {
    pub name: String,
    pub code: String,
    pub region: String,
    #[serde(default)]
    pub visited: bool,
    #[serde(default)]
    pub wishlist: bool,
    #[serde(default)]
    pub home: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl NewCountry {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            region: region.into(),
            ..Default::default()
        }
    }
}

// ─── Edits ─────────────────────────────────────────────────

/// A single strongly-typed field update. Optional fields take `None` to clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum CountryChange {
    Name(String),
    Code(String),
    Region(String),
    Visited(bool),
    Wishlist(bool),
    Home(bool),
    Status(CountryStatus),
    VisitDate(Option<NaiveDate>),
    Rating(Option<u8>),
    Notes(Option<String>),
    Cities(Vec<String>),
}

/// Radio-style status choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryStatus {
    #[default]
    None,
    Visited,
    Wishlist,
    Home,
}

impl std::fmt::Display for CountryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::None => "none",
            Self::Visited => "visited",
            Self::Wishlist => "wishlist",
            Self::Home => "home",
        })
    }
}

impl std::str::FromStr for CountryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "not-visited" | "unvisited" => Ok(Self::None),
            "visited" => Ok(Self::Visited),
            "wishlist" => Ok(Self::Wishlist),
            "home" => Ok(Self::Home),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Check a rating is within 1–5.
pub fn validate_rating(rating: u8) -> crate::Result<u8> {
    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(crate::RouteStampError::ValidationError(format!(
            "rating must be between 1 and 5, got {rating}"
        )))
    }
}
