//! Route search wrapper

use crate::error::RouteError;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;
use voyage_domain::traits::RouteSearch;
use voyage_domain::travel_date::api_date;
use voyage_domain::RouteSegment;

/// Searches departures between two directory codes
///
/// Only the first result page is requested. Failures are not retried.
pub struct RouteFinder<S>
where
    S: RouteSearch,
{
    search: Arc<S>,
}

impl<S> RouteFinder<S>
where
    S: RouteSearch,
    S::Error: Into<RouteError>,
{
    /// Create a finder over a search backend
    pub fn new(search: Arc<S>) -> Self {
        Self { search }
    }

    /// All segments from `from_code` to `to_code` departing on `date`
    pub fn search(
        &self,
        from_code: &str,
        to_code: &str,
        date: NaiveDate,
    ) -> Result<Vec<RouteSegment>, RouteError> {
        let segments = self
            .search
            .search_routes(from_code, to_code, &api_date(date), 1)
            .map_err(Into::into)?;

        info!(
            from = from_code,
            to = to_code,
            %date,
            found = segments.len(),
            "Route search complete"
        );
        Ok(segments)
    }
}
