//! Voyage Domain Layer
//!
//! This crate contains the core value types of Voyage, the conversational
//! travel planner. It has two external dependencies (uuid for session
//! identifiers, chrono for calendar dates) and defines the slot model, route
//! shapes, and the trait interfaces that all other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Slot**: one named piece of information the dialogue must obtain
//! - **TravelEntities**: the accumulated, monotonic slot state of a session
//! - **RouteSegment**: a single scheduled trip returned by route search
//! - **Itinerary**: committed segments chained across waypoints
//!
//! ## Architecture
//!
//! - Pure business logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod message;
pub mod route;
pub mod traits;
pub mod transport;
pub mod travel_date;

// Re-exports for convenience
pub use entities::{EntityUpdate, Slot, TravelEntities};
pub use message::{Message, Role, SessionId};
pub use route::{Country, Itinerary, Leg, Region, RouteSegment, Settlement, StationTree};
pub use transport::{TransportKind, TransportPreference};
pub use travel_date::DateNormalizationError;
