//! Entity extraction pipeline: service first, rules second

use crate::client::ExtractionClient;
use crate::fallback::FallbackExtractor;
use tracing::{info, warn};
use voyage_domain::traits::LlmProvider;
use voyage_domain::TravelEntities;
use voyage_llm::LlmError;

/// Turns one user message into updated travel entities
///
/// The extraction service sees the whole dialogue; if it fails for any
/// reason the rule-based extractor runs on the latest message. Extraction
/// itself never fails.
pub struct EntityExtractor<L>
where
    L: LlmProvider<Error = LlmError>,
{
    client: ExtractionClient<L>,
    fallback: FallbackExtractor,
}

impl<L> EntityExtractor<L>
where
    L: LlmProvider<Error = LlmError>,
{
    /// Create a new pipeline
    pub fn new(client: ExtractionClient<L>, fallback: FallbackExtractor) -> Self {
        Self { client, fallback }
    }

    /// Extract entities for one message
    ///
    /// - `message`: the latest user message
    /// - `dialogue`: every user message up to and including `message`
    /// - `current`: entities known before this message
    pub fn extract(
        &self,
        message: &str,
        dialogue: &str,
        current: &TravelEntities,
    ) -> TravelEntities {
        match self.client.extract(dialogue, current) {
            Ok(update) => {
                let mut entities = current.clone();
                entities.update(&update);
                info!(
                    date = %entities.date,
                    start_city = %entities.start_city,
                    end_city = %entities.end_city,
                    waypoints = entities.mid_city.len(),
                    "Entities extracted by service"
                );
                entities
            }
            Err(e) => {
                warn!(error = %e, "Extraction service failed, using fallback rules");
                self.fallback.extract(message, current)
            }
        }
    }
}
