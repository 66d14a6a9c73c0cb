//! Route module - search results and composed itineraries

use crate::transport::TransportKind;

/// One scheduled trip between two stations, as returned by route search
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    /// Transport used
    pub kind: TransportKind,

    /// Departure instant (Unix seconds, UTC)
    pub departure_utc: i64,

    /// Arrival instant (Unix seconds, UTC)
    pub arrival_utc: i64,

    /// Display name of the departure station
    pub origin: String,

    /// Display name of the arrival station
    pub destination: String,

    /// Ticket or thread reference; empty when the service has none
    pub ticket_ref: String,

    /// Travel time in seconds, the ranking cost
    pub duration_secs: f64,

    /// Distance in kilometres, zero when the service omits it
    pub distance_km: f64,
}

/// One hop of a multi-stop itinerary
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    /// City the leg starts from
    pub from: String,

    /// City the leg ends in
    pub to: String,

    /// Committed segment for this hop
    pub segment: RouteSegment,
}

/// Ordered legs spanning a list of waypoints
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Itinerary {
    /// Legs in travel order
    pub legs: Vec<Leg>,

    /// Sum of committed segment durations (seconds)
    pub total_duration_secs: f64,

    /// Sum of committed segment distances (km)
    pub total_distance_km: f64,
}

impl Itinerary {
    /// Build an itinerary, computing the aggregates from the legs
    pub fn from_legs(legs: Vec<Leg>) -> Self {
        let total_duration_secs = legs.iter().map(|leg| leg.segment.duration_secs).sum();
        let total_distance_km = legs.iter().map(|leg| leg.segment.distance_km).sum();
        Self {
            legs,
            total_duration_secs,
            total_distance_km,
        }
    }

    /// Committed segments in travel order
    pub fn segments(&self) -> impl Iterator<Item = &RouteSegment> {
        self.legs.iter().map(|leg| &leg.segment)
    }

    /// True when the itinerary has no legs
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}

/// A settlement entry of the station directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Display title, e.g. "Москва"
    pub title: String,

    /// Directory code used by route search; may be empty
    pub code: String,
}

/// A region and its settlements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    /// Region title
    pub title: String,

    /// Settlements within the region
    pub settlements: Vec<Settlement>,
}

/// A country and its regions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Country {
    /// Country title
    pub title: String,

    /// Regions within the country
    pub regions: Vec<Region>,
}

/// The full locality tree of the station directory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StationTree {
    /// Countries in directory order
    pub countries: Vec<Country>,
}

impl StationTree {
    /// Iterate over every settlement in directory order
    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.countries
            .iter()
            .flat_map(|country| country.regions.iter())
            .flat_map(|region| region.settlements.iter())
    }

    /// Number of settlements in the tree
    pub fn len(&self) -> usize {
        self.settlements().count()
    }

    /// True when the tree holds no settlements
    pub fn is_empty(&self) -> bool {
        self.settlements().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(duration: f64, distance: f64) -> RouteSegment {
        RouteSegment {
            kind: TransportKind::Train,
            departure_utc: 0,
            arrival_utc: duration as i64,
            origin: "A".to_string(),
            destination: "B".to_string(),
            ticket_ref: String::new(),
            duration_secs: duration,
            distance_km: distance,
        }
    }

    #[test]
    fn test_itinerary_aggregates() {
        let itinerary = Itinerary::from_legs(vec![
            Leg {
                from: "A".to_string(),
                to: "B".to_string(),
                segment: segment(3600.0, 100.0),
            },
            Leg {
                from: "B".to_string(),
                to: "C".to_string(),
                segment: segment(1800.0, 50.0),
            },
        ]);
        assert_eq!(itinerary.total_duration_secs, 5400.0);
        assert_eq!(itinerary.total_distance_km, 150.0);
        assert_eq!(itinerary.segments().count(), 2);
    }

    #[test]
    fn test_station_tree_iteration_order() {
        let tree = StationTree {
            countries: vec![Country {
                title: "Россия".to_string(),
                regions: vec![
                    Region {
                        title: "Москва и Московская область".to_string(),
                        settlements: vec![Settlement {
                            title: "Москва".to_string(),
                            code: "c213".to_string(),
                        }],
                    },
                    Region {
                        title: "Тверская область".to_string(),
                        settlements: vec![Settlement {
                            title: "Тверь".to_string(),
                            code: "c14".to_string(),
                        }],
                    },
                ],
            }],
        };
        let titles: Vec<_> = tree.settlements().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Москва", "Тверь"]);
        assert_eq!(tree.len(), 2);
        assert!(StationTree::default().is_empty());
    }
}
