use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A planned trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub country: String,
    pub country_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub companions: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn from_new(id: impl Into<String>, new: NewTrip, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: new.title,
            country: new.country,
            country_code: new.country_code,
            start_date: new.start_date,
            end_date: new.end_date,
            budget: new.budget,
            companions: new.companions,
            notes: new.notes,
            created_at,
        }
    }

    /// Trip start as UTC midnight.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.start_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Length in days, inclusive of both ends.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(0) + 1
    }

    pub fn apply_change(&mut self, change: &TripChange) {
        match change {
            TripChange::Title(v) => self.title = v.clone(),
            TripChange::Country { name, code } => {
                self.country = name.clone();
                self.country_code = code.clone();
            }
            TripChange::StartDate(d) => self.start_date = *d,
            TripChange::EndDate(d) => self.end_date = *d,
            TripChange::Budget(b) => self.budget = *b,
            TripChange::Companions(v) => self.companions = v.clone(),
            TripChange::Notes(v) => self.notes = v.clone(),
        }
    }
}

/// User-supplied fields for a new trip; id and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub title: String,
    pub country: String,
    pub country_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub companions: String,
    #[serde(default)]
    pub notes: String,
}

impl NewTrip {
    /// Reject trips that end before they start or have a negative budget.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::RouteStampError::ValidationError(
                "trip title must not be empty".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(crate::RouteStampError::ValidationError(format!(
                "trip ends ({}) before it starts ({})",
                self.end_date, self.start_date
            )));
        }
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(crate::RouteStampError::ValidationError(format!(
                "budget must be a non-negative number, got {}",
                self.budget
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum TripChange {
    Title(String),
    Country { name: String, code: String },
    StartDate(NaiveDate),
    EndDate(NaiveDate),
    Budget(f64),
    Companions(String),
    Notes(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> NewTrip {
        NewTrip {
            title: "Inca Trail".into(),
            country: "Peru".into(),
            country_code: "PE".into(),
            start_date: date(2030, 5, 1),
            end_date: date(2030, 5, 10),
            budget: 2500.0,
            companions: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_duration_days_inclusive() {
        let trip = Trip::from_new("t1", sample(), Utc::now());
        assert_eq!(trip.duration_days(), 10);
    }

    #[test]
    fn test_validate_rejects_reversed_dates() {
        let mut t = sample();
        assert!(t.validate().is_ok());
        t.end_date = date(2030, 4, 1);
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_budget() {
        let mut t = sample();
        t.budget = -1.0;
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_trip_json_layout() {
        let trip = Trip::from_new("t1", sample(), Utc::now());
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(json["countryCode"], "PE");
        assert_eq!(json["startDate"], "2030-05-01");
        assert!(json.get("createdAt").is_some());
    }
}
