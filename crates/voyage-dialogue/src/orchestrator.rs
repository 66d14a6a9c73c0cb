//! Dialogue state machine
//!
//! Every turn re-derives the travel entities from the whole session log:
//! extraction is folded over the user messages in arrival order, starting
//! from an empty state, each step seeing the transcript up to that message.
//! Once date, origin and destination are known the turn resolves routes;
//! otherwise it asks for what is missing.

use crate::error::DialogueError;
use crate::reply::Reply;
use crate::texts::{clarification, APOLOGY_MESSAGE, REFINE_MESSAGE};
use chrono::{Local, NaiveDate};
use std::fmt::Display;
use tracing::{error, info, warn};
use voyage_domain::traits::{LlmProvider, MessageLog, RouteSearch, StationDirectory};
use voyage_domain::travel_date::parse_travel_date;
use voyage_domain::{Message, RouteSegment, SessionId, TravelEntities};
use voyage_extractor::EntityExtractor;
use voyage_llm::LlmError;
use voyage_routes::{MultiLegComposer, RouteError};

/// Where a dialogue stands after a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    /// Mandatory slots are still missing
    Collecting,
    /// Date, origin and destination are known; routes can be resolved
    Resolving,
}

/// Drives one session turn: extraction, clarification or route resolution
pub struct DialogueOrchestrator<L, D, S>
where
    L: LlmProvider<Error = LlmError>,
    D: StationDirectory,
    S: RouteSearch,
{
    extractor: EntityExtractor<L>,
    composer: MultiLegComposer<D, S>,
    today: Option<NaiveDate>,
}

impl<L, D, S> DialogueOrchestrator<L, D, S>
where
    L: LlmProvider<Error = LlmError>,
    D: StationDirectory,
    D::Error: Into<RouteError>,
    S: RouteSearch,
    S::Error: Into<RouteError>,
{
    /// Create an orchestrator
    pub fn new(extractor: EntityExtractor<L>, composer: MultiLegComposer<D, S>) -> Self {
        Self {
            extractor,
            composer,
            today: None,
        }
    }

    /// Fix the date substituted for an unparsable travel date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Fold extraction over the user messages of `history`
    pub fn derive_entities(&self, history: &[Message]) -> TravelEntities {
        let mut entities = TravelEntities::new();
        let mut dialogue = String::new();

        for message in history.iter().filter(|m| m.is_user()) {
            if !dialogue.is_empty() {
                dialogue.push('\n');
            }
            dialogue.push_str(&message.text);
            entities = self.extractor.extract(&message.text, &dialogue, &entities);
        }
        entities
    }

    /// State implied by the entities
    pub fn state(entities: &TravelEntities) -> DialogueState {
        if entities.is_complete() {
            DialogueState::Resolving
        } else {
            DialogueState::Collecting
        }
    }

    /// Reply to the latest turn of `history`
    pub fn respond(&self, history: &[Message]) -> Reply {
        let entities = self.derive_entities(history);
        match Self::state(&entities) {
            DialogueState::Collecting => {
                info!(missing = entities.missing().len(), "Asking for missing slots");
                Reply::message(clarification(&entities))
            }
            DialogueState::Resolving => match self.resolve(&entities) {
                Ok(segments) if segments.is_empty() => {
                    info!(route = %entities.route_description(), "No departures found");
                    Reply::message(REFINE_MESSAGE)
                }
                Ok(segments) => {
                    info!(
                        route = %entities.route_description(),
                        options = segments.len(),
                        "Schedule ready"
                    );
                    Reply::schedule(&segments)
                }
                Err(
                    e @ (RouteError::Service(_)
                    | RouteError::CityNotFound(_)
                    | RouteError::IncompleteRoute { .. }),
                ) => {
                    warn!(error = %e, "Route resolution failed");
                    Reply::message(REFINE_MESSAGE)
                }
                Err(e) => {
                    error!(error = %e, "Unexpected route failure");
                    Reply::message(APOLOGY_MESSAGE)
                }
            },
        }
    }

    /// Handle one inbound message for a session
    ///
    /// The message is appended to the log before the reply is computed. A
    /// text reply is appended as an assistant message; a schedule reply
    /// clears the session so the next message starts a new request. Log
    /// failures produce the apology reply.
    pub fn handle_message<M>(&self, log: &M, session: SessionId, text: &str) -> Reply
    where
        M: MessageLog,
        M::Error: Display,
    {
        match self.try_handle_message(log, session, text) {
            Ok(reply) => reply,
            Err(e) => {
                error!(%session, error = %e, "Dialogue turn failed");
                Reply::message(APOLOGY_MESSAGE)
            }
        }
    }

    fn try_handle_message<M>(
        &self,
        log: &M,
        session: SessionId,
        text: &str,
    ) -> Result<Reply, DialogueError>
    where
        M: MessageLog,
        M::Error: Display,
    {
        let log_error = |e: M::Error| DialogueError::Log(e.to_string());

        log.append(session, Message::user(text)).map_err(log_error)?;
        let history = log.read_all(session).map_err(log_error)?;
        info!(%session, messages = history.len(), "Handling turn");

        let reply = self.respond(&history);
        match &reply {
            Reply::Schedule { .. } => log.clear(session).map_err(log_error)?,
            Reply::Message { text } => log
                .append(session, Message::assistant(text.as_str()))
                .map_err(log_error)?,
        }
        Ok(reply)
    }

    fn resolve(&self, entities: &TravelEntities) -> Result<Vec<RouteSegment>, RouteError> {
        let date = parse_travel_date(&entities.date).unwrap_or_else(|e| {
            let today = self.today();
            warn!(error = %e, %today, "Travel date not understood, searching today");
            today
        });

        let waypoints = entities.waypoints();
        let pref = &entities.preferred_transport;
        if let [from, to] = waypoints.as_slice() {
            return self.composer.direct_options(from, to, date, pref);
        }

        let itinerary = self.composer.compose(&waypoints, date, pref)?;
        info!(
            legs = itinerary.legs.len(),
            total_duration_secs = itinerary.total_duration_secs,
            "Itinerary composed"
        );
        Ok(itinerary.segments().cloned().collect())
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use voyage_domain::TransportKind;
    use voyage_extractor::{ExtractionClient, ExtractorConfig, FallbackExtractor};
    use voyage_llm::{MockProvider, RateLimiter};
    use voyage_routes::{MockRouteService, RoutesConfig};

    type TestOrchestrator = DialogueOrchestrator<MockProvider, MockRouteService, MockRouteService>;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
    }

    fn orchestrator(provider: MockProvider, routes: MockRouteService) -> TestOrchestrator {
        let config = ExtractorConfig {
            max_rps: 1000.0,
            throttle_secs: 0.0,
            request_timeout_secs: 1,
            max_retry_after_secs: 1.0,
        };
        let limiter = Arc::new(RateLimiter::new(config.max_rps).unwrap());
        let client = ExtractionClient::new(Arc::new(provider), limiter, config);
        let extractor = EntityExtractor::new(client, FallbackExtractor::with_today(today()));

        let routes = Arc::new(routes);
        let config = RoutesConfig::default();
        let composer = MultiLegComposer::from_services(Arc::clone(&routes), routes, &config);
        DialogueOrchestrator::new(extractor, composer).with_today(today())
    }

    fn routes() -> MockRouteService {
        MockRouteService::new()
            .with_city("Kazan", "c43")
            .with_city("Samara", "c51")
            .with_route(
                "c43",
                "c51",
                vec![MockRouteService::segment(
                    TransportKind::Bus,
                    "Kazan",
                    "Samara",
                    1000,
                    21600.0,
                )],
            )
    }

    #[test]
    fn test_state_follows_completeness() {
        let mut entities = TravelEntities::new();
        assert_eq!(TestOrchestrator::state(&entities), DialogueState::Collecting);
        entities.date = "01.05.2025".to_string();
        entities.start_city = "Kazan".to_string();
        entities.end_city = "Samara".to_string();
        assert_eq!(TestOrchestrator::state(&entities), DialogueState::Resolving);
    }

    #[test]
    fn test_assistant_messages_are_not_extracted() {
        let provider = MockProvider::new(r#"{"start_city": "Kazan"}"#);
        let orchestrator = orchestrator(provider.clone(), routes());
        let history = vec![
            Message::user("from Kazan"),
            Message::assistant("Please tell me the travel date, the arrival city."),
        ];

        let entities = orchestrator.derive_entities(&history);
        assert_eq!(entities.start_city, "Kazan");
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_empty_history_gets_opening() {
        let orchestrator = orchestrator(MockProvider::unconfigured(), routes());
        assert_eq!(
            orchestrator.respond(&[]),
            Reply::message(crate::texts::OPENING_MESSAGE)
        );
    }

    #[test]
    fn test_unparsable_date_searches_today() {
        let provider = MockProvider::new(
            r#"{"date": "first of May", "start_city": "Kazan", "end_city": "Samara"}"#,
        );
        let routes = routes();
        let orchestrator = orchestrator(provider, routes.clone());

        let reply = orchestrator.respond(&[Message::user("Kazan to Samara on the first of May")]);
        assert!(reply.is_schedule());
        assert_eq!(routes.searches()[0].2, "2025-04-20");
    }

    #[test]
    fn test_unknown_city_asks_to_refine() {
        let provider = MockProvider::new(
            r#"{"date": "01.05.2025", "start_city": "Kazan", "end_city": "Atlantis"}"#,
        );
        let orchestrator = orchestrator(provider, routes());
        let reply = orchestrator.respond(&[Message::user("Kazan to Atlantis on 01.05.2025")]);
        assert_eq!(reply, Reply::message(REFINE_MESSAGE));
    }

    #[test]
    fn test_service_outage_asks_to_refine() {
        let provider = MockProvider::new(
            r#"{"date": "01.05.2025", "start_city": "Kazan", "end_city": "Samara"}"#,
        );
        let orchestrator = orchestrator(provider, routes().failing());
        let reply = orchestrator.respond(&[Message::user("Kazan to Samara")]);
        assert_eq!(reply, Reply::message(REFINE_MESSAGE));
    }
}
