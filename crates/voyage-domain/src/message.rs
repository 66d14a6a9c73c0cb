//! Message module - dialogue log entries and session identifiers

use std::fmt;

/// Identifier of a dialogue session (UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u128);

impl SessionId {
    /// Generate a new random session id
    ///
    /// # Examples
    ///
    /// ```
    /// use voyage_domain::SessionId;
    ///
    /// let a = SessionId::new();
    /// let b = SessionId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().as_u128())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id.as_u128())
    }

    /// Parse a session id from its hyphenated UUID form
    ///
    /// # Examples
    ///
    /// ```
    /// use voyage_domain::SessionId;
    ///
    /// let id = SessionId::new();
    /// let parsed = SessionId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self::from_uuid)
            .map_err(|e| format!("Invalid session id: {}", e))
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> uuid::Uuid {
        uuid::Uuid::from_u128(self.0)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_uuid())
    }
}

/// Author of a dialogue message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The traveller
    User,
    /// The engine's own replies
    Assistant,
}

impl Role {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a session's append-only log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Who wrote the message
    pub role: Role,

    /// Message text
    pub text: String,
}

impl Message {
    /// Message written by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Message written by the engine
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    /// True for user-authored messages
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
