//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Message, RouteSegment, SessionId, StationTree};

/// Trait for LLM completion providers
///
/// Implemented by the infrastructure layer (voyage-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for a prompt
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Whether the provider has the credentials it needs to make calls
    fn is_configured(&self) -> bool {
        true
    }
}

/// Trait for the settlement directory of the transit service
///
/// Implemented by the infrastructure layer (voyage-routes)
pub trait StationDirectory {
    /// Error type for directory operations
    type Error;

    /// Fetch the full locality tree in the given language (e.g. "ru_RU")
    fn list_stations(&self, lang: &str) -> Result<StationTree, Self::Error>;
}

/// Trait for the route search endpoint of the transit service
///
/// Implemented by the infrastructure layer (voyage-routes)
pub trait RouteSearch {
    /// Error type for search operations
    type Error;

    /// Search segments between two directory codes on a date (`YYYY-MM-DD`)
    fn search_routes(
        &self,
        from_code: &str,
        to_code: &str,
        date: &str,
        page: u32,
    ) -> Result<Vec<RouteSegment>, Self::Error>;
}

/// Trait for the per-session, append-only message log
///
/// Implemented by the application layer (voyage-dialogue)
pub trait MessageLog {
    /// Error type for log operations
    type Error;

    /// Append a message to the end of a session's log
    fn append(&self, session: SessionId, message: Message) -> Result<(), Self::Error>;

    /// Read every message of a session in arrival order
    fn read_all(&self, session: SessionId) -> Result<Vec<Message>, Self::Error>;

    /// Drop a session's log
    fn clear(&self, session: SessionId) -> Result<(), Self::Error>;
}
