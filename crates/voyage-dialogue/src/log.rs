//! In-memory session message log

use crate::error::DialogueError;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use voyage_domain::traits::MessageLog;
use voyage_domain::{Message, SessionId};

/// Idle lifetime of a session when none is configured
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct SessionLog {
    messages: Vec<Message>,
    last_touched: Instant,
}

/// Append-only message log kept in process memory
///
/// A session lives until it is cleared or stays idle for longer than the
/// log's TTL. Idle sessions are evicted on the next append to any session.
#[derive(Debug)]
pub struct InMemoryMessageLog {
    sessions: RwLock<HashMap<SessionId, SessionLog>>,
    idle_ttl: Duration,
}

impl InMemoryMessageLog {
    /// Create an empty log with the default idle TTL
    pub fn new() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }

    /// Create an empty log forgetting sessions idle for longer than `idle_ttl`
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Number of sessions with at least one message
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Default for InMemoryMessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog for InMemoryMessageLog {
    type Error = DialogueError;

    fn append(&self, session: SessionId, message: Message) -> Result<(), Self::Error> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|id, log| {
            *id == session || now.duration_since(log.last_touched) <= self.idle_ttl
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, "Evicted idle sessions");
        }

        let log = sessions.entry(session).or_insert_with(|| SessionLog {
            messages: Vec::new(),
            last_touched: now,
        });
        if now.duration_since(log.last_touched) > self.idle_ttl {
            log.messages.clear();
        }
        log.messages.push(message);
        log.last_touched = now;
        debug!(%session, messages = log.messages.len(), "Message appended");
        Ok(())
    }

    fn read_all(&self, session: SessionId) -> Result<Vec<Message>, Self::Error> {
        Ok(self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&session)
            .map(|log| log.messages.clone())
            .unwrap_or_default())
    }

    fn clear(&self, session: SessionId) -> Result<(), Self::Error> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&session);
        debug!(%session, "Session cleared");
        Ok(())
    }
}
