//! In-memory transit service for tests

use crate::error::RouteError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use voyage_domain::traits::{RouteSearch, StationDirectory};
use voyage_domain::{Country, Region, RouteSegment, Settlement, StationTree, TransportKind};

/// Deterministic directory and search backend
///
/// # Examples
///
/// ```
/// use voyage_domain::traits::RouteSearch;
/// use voyage_domain::TransportKind;
/// use voyage_routes::MockRouteService;
///
/// let service = MockRouteService::new()
///     .with_city("Moscow", "c213")
///     .with_city("Tver", "c14")
///     .with_route("c213", "c14", vec![
///         MockRouteService::segment(TransportKind::Train, "Moscow", "Tver", 0, 5400.0),
///     ]);
///
/// let found = service.search_routes("c213", "c14", "2025-05-01", 1).unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRouteService {
    tree: StationTree,
    routes: HashMap<(String, String), Vec<RouteSegment>>,
    failing: bool,
    directory_calls: Arc<AtomicUsize>,
    searches: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MockRouteService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a settlement to the directory
    pub fn with_city(mut self, title: impl Into<String>, code: impl Into<String>) -> Self {
        if self.tree.countries.is_empty() {
            self.tree.countries.push(Country {
                title: "Mockland".to_string(),
                regions: vec![Region::default()],
            });
        }
        let region = &mut self.tree.countries[0].regions[0];
        region.settlements.push(Settlement {
            title: title.into(),
            code: code.into(),
        });
        self
    }

    /// Segments returned for searches between two codes
    pub fn with_route(
        mut self,
        from_code: impl Into<String>,
        to_code: impl Into<String>,
        segments: Vec<RouteSegment>,
    ) -> Self {
        self.routes.insert((from_code.into(), to_code.into()), segments);
        self
    }

    /// Make every directory and search call fail
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Build a segment departing at `departure_utc`
    pub fn segment(
        kind: TransportKind,
        origin: &str,
        destination: &str,
        departure_utc: i64,
        duration_secs: f64,
    ) -> RouteSegment {
        RouteSegment {
            kind,
            departure_utc,
            arrival_utc: departure_utc + duration_secs as i64,
            origin: origin.to_string(),
            destination: destination.to_string(),
            ticket_ref: format!("{}-{}-{}", kind, departure_utc, duration_secs as i64),
            duration_secs,
            distance_km: 0.0,
        }
    }

    /// Number of directory fetches so far
    pub fn directory_calls(&self) -> usize {
        self.directory_calls.load(Ordering::SeqCst)
    }

    /// Searches made so far as `(from, to, date)`
    pub fn searches(&self) -> Vec<(String, String, String)> {
        self.searches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl StationDirectory for MockRouteService {
    type Error = RouteError;

    fn list_stations(&self, _lang: &str) -> Result<StationTree, Self::Error> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(RouteError::Service("mock directory unavailable".to_string()));
        }
        Ok(self.tree.clone())
    }
}

impl RouteSearch for MockRouteService {
    type Error = RouteError;

    fn search_routes(
        &self,
        from_code: &str,
        to_code: &str,
        date: &str,
        _page: u32,
    ) -> Result<Vec<RouteSegment>, Self::Error> {
        self.searches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((from_code.to_string(), to_code.to_string(), date.to_string()));
        if self.failing {
            return Err(RouteError::Service("mock search unavailable".to_string()));
        }
        Ok(self
            .routes
            .get(&(from_code.to_string(), to_code.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
