//! Entities module - the slot state a dialogue accumulates
//!
//! [`TravelEntities`] only ever grows: an extraction can fill or replace a
//! slot but never blank one out. The one exception is an explicit `false`
//! for a transport flag, which the user may state to withdraw a preference.

use crate::transport::{TransportKind, TransportPreference};
use std::collections::BTreeMap;

/// A mandatory slot the dialogue must obtain before resolving a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Departure date
    Date,
    /// Origin city
    Origin,
    /// Destination city
    Destination,
}

impl Slot {
    /// Get the slot name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Date => "date",
            Slot::Origin => "start_city",
            Slot::Destination => "end_city",
        }
    }
}

/// Raw output of one extraction pass
///
/// Every field is optional: `None` means the extractor did not mention the
/// slot at all. For transport flags only the keys present are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityUpdate {
    /// Date in `dd.mm.yyyy`
    pub date: Option<String>,

    /// Origin city
    pub start_city: Option<String>,

    /// Destination city
    pub end_city: Option<String>,

    /// Waypoint cities
    pub mid_city: Option<Vec<String>>,

    /// Explicitly stated transport flags
    pub prefered_transport: BTreeMap<TransportKind, bool>,
}

/// Accumulated travel slots for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelEntities {
    /// Departure date normalized to `dd.mm.yyyy`, empty if unknown
    pub date: String,

    /// Origin city, empty if unknown
    pub start_city: String,

    /// Destination city, empty if unknown
    pub end_city: String,

    /// Waypoints. Duplicates are collapsed; insertion order is kept so
    /// multi-leg composition is deterministic.
    pub mid_city: Vec<String>,

    /// Preferred transport kinds
    pub preferred_transport: TransportPreference,
}

impl TravelEntities {
    /// Create an empty entity set
    pub fn new() -> Self {
        Self::default()
    }

    /// True when date, origin and destination are all known
    ///
    /// Waypoints and transport preference never gate completeness.
    pub fn is_complete(&self) -> bool {
        !self.date.is_empty() && !self.start_city.is_empty() && !self.end_city.is_empty()
    }

    /// True when no slot at all is known, including optional ones
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
            && self.start_city.is_empty()
            && self.end_city.is_empty()
            && self.mid_city.is_empty()
            && !self.preferred_transport.any_selected()
    }

    /// Mandatory slots still missing, in asking order
    pub fn missing(&self) -> Vec<Slot> {
        let mut missing = Vec::new();
        if self.date.is_empty() {
            missing.push(Slot::Date);
        }
        if self.start_city.is_empty() {
            missing.push(Slot::Origin);
        }
        if self.end_city.is_empty() {
            missing.push(Slot::Destination);
        }
        missing
    }

    /// Merge an extraction into this state
    ///
    /// Scalar slots are replaced only by non-empty values, waypoints are
    /// unioned, and transport flags present in the update overwrite the
    /// current flags (including an explicit `false`).
    pub fn update(&mut self, update: &EntityUpdate) {
        if let Some(date) = non_empty(update.date.as_deref()) {
            self.date = date.to_string();
        }
        if let Some(city) = non_empty(update.start_city.as_deref()) {
            self.start_city = city.to_string();
        }
        if let Some(city) = non_empty(update.end_city.as_deref()) {
            self.end_city = city.to_string();
        }
        if let Some(cities) = &update.mid_city {
            for city in cities {
                self.add_waypoint(city);
            }
        }
        for (kind, selected) in &update.prefered_transport {
            self.preferred_transport.set(*kind, *selected);
        }
    }

    /// Add a waypoint unless it is blank or already known
    pub fn add_waypoint(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() || self.mid_city.iter().any(|known| known == city) {
            return;
        }
        self.mid_city.push(city.to_string());
    }

    /// Ordered stops of the trip: origin, waypoints, destination
    ///
    /// Waypoints equal to the origin or destination are skipped.
    pub fn waypoints(&self) -> Vec<String> {
        let start = self.start_city.to_lowercase();
        let end = self.end_city.to_lowercase();
        let mut stops = vec![self.start_city.clone()];
        stops.extend(
            self.mid_city
                .iter()
                .filter(|city| {
                    let city = city.to_lowercase();
                    city != start && city != end
                })
                .cloned(),
        );
        stops.push(self.end_city.clone());
        stops
    }

    /// Human-readable route, e.g. `Moscow → Tver → Saint Petersburg`
    pub fn route_description(&self) -> String {
        self.waypoints().join(" → ")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
