//! Voyage Dialogue
//!
//! Turns a session's message log into a reply. Each turn re-derives the
//! travel entities from the whole log, then either asks for what is still
//! missing or resolves routes and answers with a schedule.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use voyage_dialogue::{DialogueOrchestrator, InMemoryMessageLog, Reply};
//! use voyage_domain::SessionId;
//! use voyage_extractor::{EntityExtractor, ExtractionClient, ExtractorConfig, FallbackExtractor};
//! use voyage_llm::{MockProvider, RateLimiter};
//! use voyage_routes::{MockRouteService, MultiLegComposer, RoutesConfig};
//!
//! let config = ExtractorConfig::default();
//! let limiter = Arc::new(RateLimiter::new(config.max_rps).unwrap());
//! let client = ExtractionClient::new(Arc::new(MockProvider::unconfigured()), limiter, config);
//! let extractor = EntityExtractor::new(client, FallbackExtractor::new());
//!
//! let routes = Arc::new(MockRouteService::new());
//! let config = RoutesConfig::default();
//! let composer = MultiLegComposer::from_services(Arc::clone(&routes), routes, &config);
//! let orchestrator = DialogueOrchestrator::new(extractor, composer);
//!
//! let log = InMemoryMessageLog::new();
//! let reply = orchestrator.handle_message(&log, SessionId::new(), "hello");
//! assert!(matches!(reply, Reply::Message { .. }));
//! ```

#![warn(missing_docs)]

mod error;
mod log;
mod orchestrator;
mod reply;
pub mod texts;

pub use error::DialogueError;
pub use log::{InMemoryMessageLog, DEFAULT_IDLE_TTL};
pub use orchestrator::{DialogueOrchestrator, DialogueState};
pub use reply::{Reply, ScheduleObject};
