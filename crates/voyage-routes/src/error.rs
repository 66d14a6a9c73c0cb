//! Error types for route resolution

use thiserror::Error;

/// Errors that can occur while resolving a route
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    /// Directory or search service failed (network, HTTP status, decoding)
    #[error("Route service error: {0}")]
    Service(String),

    /// No settlement with this exact title
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// A leg of a multi-stop trip has no departures
    #[error("No route found from {from} to {to}")]
    IncompleteRoute {
        /// Leg origin
        from: String,
        /// Leg destination
        to: String,
    },

    /// Fewer than two stops were given
    #[error("At least two waypoints are required, got {0}")]
    InsufficientWaypoints(usize),
}
