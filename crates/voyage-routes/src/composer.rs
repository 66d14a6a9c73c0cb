//! Trip composition across waypoints

use crate::config::RoutesConfig;
use crate::directory::RouteDirectory;
use crate::error::RouteError;
use crate::ranker::RouteRanker;
use crate::search::RouteFinder;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};
use voyage_domain::traits::{RouteSearch, StationDirectory};
use voyage_domain::{Itinerary, Leg, RouteSegment, TransportPreference};

/// Builds direct options and multi-stop itineraries
///
/// Each leg commits its fastest admitted segment. A leg without departures
/// fails the whole trip; partial itineraries are never returned.
pub struct MultiLegComposer<D, S>
where
    D: StationDirectory,
    S: RouteSearch,
{
    directory: RouteDirectory<D>,
    finder: RouteFinder<S>,
    ranker: RouteRanker,
}

impl<D, S> MultiLegComposer<D, S>
where
    D: StationDirectory,
    D::Error: Into<RouteError>,
    S: RouteSearch,
    S::Error: Into<RouteError>,
{
    /// Create a composer
    pub fn new(directory: RouteDirectory<D>, finder: RouteFinder<S>, ranker: RouteRanker) -> Self {
        Self {
            directory,
            finder,
            ranker,
        }
    }

    /// Create a composer over directory and search backends
    pub fn from_services(directory: Arc<D>, search: Arc<S>, config: &RoutesConfig) -> Self {
        Self::new(
            RouteDirectory::new(directory, config.lang.clone()),
            RouteFinder::new(search),
            RouteRanker::new(config.max_options, config.leg_candidates),
        )
    }

    /// Ranked, transport-diversified options for a two-stop trip
    ///
    /// An empty list means the service had nothing for that day.
    pub fn direct_options(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
        pref: &TransportPreference,
    ) -> Result<Vec<RouteSegment>, RouteError> {
        let segments = self.search_leg(from, to, date)?;
        let options = self.ranker.diversified(&segments, pref);
        info!(from, to, found = segments.len(), offered = options.len(), "Direct options ranked");
        Ok(options)
    }

    /// Chain the fastest segment of every consecutive pair of `waypoints`
    pub fn compose(
        &self,
        waypoints: &[String],
        date: NaiveDate,
        pref: &TransportPreference,
    ) -> Result<Itinerary, RouteError> {
        if waypoints.len() < 2 {
            return Err(RouteError::InsufficientWaypoints(waypoints.len()));
        }

        let mut legs = Vec::with_capacity(waypoints.len() - 1);
        for pair in waypoints.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let segments = self.search_leg(from, to, date)?;

            let Some(segment) = self.ranker.fastest(&segments, pref).into_iter().next() else {
                warn!(from = %from, to = %to, "No departures for leg");
                return Err(RouteError::IncompleteRoute {
                    from: from.clone(),
                    to: to.clone(),
                });
            };

            info!(from = %from, to = %to, kind = %segment.kind, "Leg committed");
            legs.push(Leg {
                from: from.clone(),
                to: to.clone(),
                segment,
            });
        }

        Ok(Itinerary::from_legs(legs))
    }

    fn search_leg(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Vec<RouteSegment>, RouteError> {
        let from_code = self.directory.resolve_city(from)?;
        let to_code = self.directory.resolve_city(to)?;
        self.finder.search(&from_code, &to_code, date)
    }
}
