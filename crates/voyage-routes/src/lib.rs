//! Voyage Routes
//!
//! Turns a complete travel request into concrete departures: resolves city
//! names to directory codes, searches the transit service, ranks results
//! under the traveller's transport preference and chains legs across
//! waypoints.
//!
//! # Architecture
//!
//! ```text
//! MultiLegComposer ─> RouteDirectory ─> StationDirectory (RaspClient / mock)
//!                  ─> RouteFinder    ─> RouteSearch      (RaspClient / mock)
//!                  ─> RouteRanker
//! ```

#![warn(missing_docs)]

mod composer;
mod config;
mod directory;
mod error;
pub mod mock;
pub mod ranker;
pub mod rasp;
mod search;

pub use composer::MultiLegComposer;
pub use config::RoutesConfig;
pub use directory::RouteDirectory;
pub use error::RouteError;
pub use mock::MockRouteService;
pub use ranker::{rank_diversified, rank_fastest, RouteRanker};
pub use rasp::{RaspClient, RaspError};
pub use search::RouteFinder;
