//! Dialogue service behind the HTTP handlers

use voyage_dialogue::{DialogueOrchestrator, InMemoryMessageLog, Reply};
use voyage_domain::traits::{LlmProvider, RouteSearch, StationDirectory};
use voyage_domain::SessionId;
use voyage_llm::LlmError;
use voyage_routes::RouteError;

/// A running conversation backend, shared across request handlers
///
/// `handle_message` blocks; call it from a blocking context.
pub trait Conversation: Send + Sync {
    /// Process one user message and return the reply
    fn handle_message(&self, session: SessionId, text: &str) -> Reply;

    /// Number of sessions with an open request
    fn session_count(&self) -> usize;
}

/// Orchestrator paired with the in-memory session log
pub struct DialogueService<L, D, S>
where
    L: LlmProvider<Error = LlmError>,
    D: StationDirectory,
    S: RouteSearch,
{
    orchestrator: DialogueOrchestrator<L, D, S>,
    log: InMemoryMessageLog,
}

impl<L, D, S> DialogueService<L, D, S>
where
    L: LlmProvider<Error = LlmError>,
    D: StationDirectory,
    S: RouteSearch,
{
    /// Create a service with an empty log
    pub fn new(orchestrator: DialogueOrchestrator<L, D, S>) -> Self {
        Self::with_log(orchestrator, InMemoryMessageLog::new())
    }

    /// Create a service over an existing log
    pub fn with_log(
        orchestrator: DialogueOrchestrator<L, D, S>,
        log: InMemoryMessageLog,
    ) -> Self {
        Self { orchestrator, log }
    }
}

impl<L, D, S> Conversation for DialogueService<L, D, S>
where
    L: LlmProvider<Error = LlmError> + Send + Sync,
    D: StationDirectory + Send + Sync,
    D::Error: Into<RouteError>,
    S: RouteSearch + Send + Sync,
    S::Error: Into<RouteError>,
{
    fn handle_message(&self, session: SessionId, text: &str) -> Reply {
        self.orchestrator.handle_message(&self.log, session, text)
    }

    fn session_count(&self) -> usize {
        self.log.session_count()
    }
}
