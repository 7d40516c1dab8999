use chrono::{DateTime, Utc};
use tracing::debug;
use ulid::{Generator, Ulid};

use crate::error::{Result, RouteStampError};
use crate::models::{NewTrip, Trip, TripChange};
use crate::storage::{self, KeyValueStore, TRIPS_KEY};

/// Planned trips, persisted as one JSON array. No undo history.
pub struct TripStore<S: KeyValueStore> {
    backend: S,
    trips: Vec<Trip>,
    ids: Generator,
}

impl<S: KeyValueStore> TripStore<S> {
    /// Load saved trips; starts empty when nothing is stored or the data is unreadable.
    pub fn load(backend: S) -> Self {
        let trips = storage::load_or_log::<Vec<Trip>, _>(&backend, TRIPS_KEY).unwrap_or_default();
        Self {
            backend,
            trips,
            ids: Generator::new(),
        }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn get(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == id)
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    pub fn add(&mut self, trip: NewTrip) -> Result<String> {
        trip.validate()?;
        let id = self.ids.generate().unwrap_or_else(|_| Ulid::new()).to_string();
        debug!(%id, title = %trip.title, "adding trip");
        self.trips.push(Trip::from_new(id.clone(), trip, Utc::now()));
        self.persist();
        Ok(id)
    }

    pub fn edit(&mut self, id: &str, changes: &[TripChange]) -> Result<()> {
        let trip = self
            .trips
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RouteStampError::TripNotFound(id.to_string()))?;

        let mut updated = trip.clone();
        for change in changes {
            updated.apply_change(change);
        }
        if updated.end_date < updated.start_date {
            return Err(RouteStampError::ValidationError(format!(
                "trip ends ({}) before it starts ({})",
                updated.end_date, updated.start_date
            )));
        }
        *trip = updated;
        self.persist();
        Ok(())
    }

    /// Remove a trip. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.trips.len();
        self.trips.retain(|t| t.id != id);
        let removed = self.trips.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Earliest trip starting strictly after `now`.
    pub fn next_trip(&self, now: DateTime<Utc>) -> Option<&Trip> {
        self.trips
            .iter()
            .filter(|t| t.starts_at() > now)
            .min_by_key(|t| t.starts_at())
    }

    /// Trips starting after `now`, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<&Trip> {
        let mut trips: Vec<&Trip> = self.trips.iter().filter(|t| t.starts_at() > now).collect();
        trips.sort_by_key(|t| t.starts_at());
        trips
    }

    pub fn total_budget(&self) -> f64 {
        self.trips.iter().map(|t| t.budget).sum()
    }

    fn persist(&mut self) {
        storage::persist_or_log(&mut self.backend, TRIPS_KEY, &self.trips);
    }
}

/// Whole days until `trip` starts, rounded up; never negative.
pub fn days_until(trip: &Trip, now: DateTime<Utc>) -> i64 {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let diff = (trip.starts_at() - now).num_milliseconds();
    if diff <= 0 {
        return 0;
    }
    (diff + DAY_MS - 1) / DAY_MS
}
