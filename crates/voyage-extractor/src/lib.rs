//! Voyage Extractor
//!
//! Turns free-text travel requests into [`TravelEntities`] slots.
//!
//! # Architecture
//!
//! ```text
//! message ─┬─> ExtractionClient ─> LLM ─> parser ─> TravelEntities::update
//!          │        (rate limited, one retry on 429)
//!          └─> FallbackExtractor (on any service error)
//! ```
//!
//! [`EntityExtractor`] is the only entry point callers need; it never fails.
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use voyage_domain::TravelEntities;
//! use voyage_extractor::{EntityExtractor, ExtractionClient, ExtractorConfig, FallbackExtractor};
//! use voyage_llm::{MockProvider, RateLimiter};
//!
//! let provider = Arc::new(MockProvider::new(r#"{"start_city": "Moscow"}"#));
//! let limiter = Arc::new(RateLimiter::new(10.0).unwrap());
//! let client = ExtractionClient::new(provider, limiter, ExtractorConfig::default());
//! let extractor = EntityExtractor::new(client, FallbackExtractor::new());
//!
//! let entities = extractor.extract("from Moscow", "from Moscow", &TravelEntities::new());
//! assert_eq!(entities.start_city, "Moscow");
//! ```
//!
//! [`TravelEntities`]: voyage_domain::TravelEntities

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod extractor;
pub mod fallback;
mod parser;
pub mod prompt;


pub use client::ExtractionClient;
pub use config::ExtractorConfig;
pub use error::ExtractionServiceError;
pub use extractor::EntityExtractor;
pub use fallback::{CityMatches, FallbackExtractor};
pub use parser::parse_llm_response;
