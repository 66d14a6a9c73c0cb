//! Wire types returned to the client

use serde::{Deserialize, Serialize};
use voyage_domain::RouteSegment;

/// One departure offered to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleObject {
    /// Transport kind (`bus`, `train`, `plane`, `ship`, `walk`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Departure, Unix seconds
    pub time_start_utc: i64,

    /// Arrival, Unix seconds
    pub time_end_utc: i64,

    /// Departure station
    pub place_start: String,

    /// Arrival station
    pub place_finish: String,

    /// Ticket reference, empty when unknown
    pub ticket_url: String,
}

impl From<&RouteSegment> for ScheduleObject {
    fn from(segment: &RouteSegment) -> Self {
        Self {
            kind: segment.kind.as_str().to_string(),
            time_start_utc: segment.departure_utc,
            time_end_utc: segment.arrival_utc,
            place_start: segment.origin.clone(),
            place_finish: segment.destination.clone(),
            ticket_url: segment.ticket_ref.clone(),
        }
    }
}

/// Response to one user turn
///
/// Serialized with a `type` tag:
///
/// ```
/// use voyage_dialogue::Reply;
///
/// let json = serde_json::to_string(&Reply::message("Hi")).unwrap();
/// assert_eq!(json, r#"{"type":"message","text":"Hi"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reply {
    /// Free text: a clarification, refine request or apology
    Message {
        /// Text shown to the user
        text: String,
    },

    /// Departures for a complete request
    Schedule {
        /// Departures in ranked or travel order
        objects: Vec<ScheduleObject>,
    },
}

impl Reply {
    /// Text reply
    pub fn message(text: impl Into<String>) -> Self {
        Reply::Message { text: text.into() }
    }

    /// Schedule reply built from segments, keeping their order
    pub fn schedule<'a>(segments: impl IntoIterator<Item = &'a RouteSegment>) -> Self {
        Reply::Schedule {
            objects: segments.into_iter().map(ScheduleObject::from).collect(),
        }
    }

    /// True for a schedule reply
    pub fn is_schedule(&self) -> bool {
        matches!(self, Reply::Schedule { .. })
    }

    /// Text of a message reply
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Message { text } => Some(text),
            Reply::Schedule { .. } => None,
        }
    }
}
