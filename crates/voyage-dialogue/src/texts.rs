//! User-facing texts

use voyage_domain::{Slot, TravelEntities};

/// Reply when nothing about the trip is known yet
pub const OPENING_MESSAGE: &str = "Hello! To find the best route for you I need a few details \
about the trip. Please tell me the travel date, the departure city and the arrival city.";

/// Reply when a complete request produced no route
pub const REFINE_MESSAGE: &str = "I could not find a route for this request. \
Please check the city names and the date, or try a different route.";

/// Reply when the turn failed for an internal reason
pub const APOLOGY_MESSAGE: &str = "Sorry, something went wrong on our side. Please try again.";

fn slot_phrase(slot: Slot) -> &'static str {
    match slot {
        Slot::Date => "the travel date",
        Slot::Origin => "the departure city",
        Slot::Destination => "the arrival city",
    }
}

/// Ask for the missing mandatory slots and echo what is already known
///
/// # Examples
///
/// ```
/// use voyage_dialogue::texts::clarification;
/// use voyage_domain::TravelEntities;
///
/// let mut entities = TravelEntities::new();
/// entities.start_city = "Moscow".to_string();
///
/// let text = clarification(&entities);
/// assert!(text.starts_with("Please tell me the travel date, the arrival city."));
/// assert!(text.ends_with("Known: from: Moscow."));
/// ```
pub fn clarification(entities: &TravelEntities) -> String {
    if entities.is_empty() {
        return OPENING_MESSAGE.to_string();
    }

    let missing: Vec<&str> = entities.missing().into_iter().map(slot_phrase).collect();
    let mut text = if missing.is_empty() {
        format!("Looking for routes {} on {}.", entities.route_description(), entities.date)
    } else {
        format!("Please tell me {}.", missing.join(", "))
    };

    let known = known_summary(entities);
    if !known.is_empty() {
        text.push_str("\n\nKnown: ");
        text.push_str(&known.join("; "));
        text.push('.');
    }
    text
}

fn known_summary(entities: &TravelEntities) -> Vec<String> {
    let mut known = Vec::new();
    if !entities.date.is_empty() {
        known.push(format!("date: {}", entities.date));
    }
    if !entities.start_city.is_empty() {
        known.push(format!("from: {}", entities.start_city));
    }
    if !entities.end_city.is_empty() {
        known.push(format!("to: {}", entities.end_city));
    }
    if !entities.mid_city.is_empty() {
        known.push(format!("via: {}", entities.mid_city.join(", ")));
    }
    let transport = entities.preferred_transport.selected();
    if !transport.is_empty() {
        let names: Vec<&str> = transport.iter().map(|kind| kind.as_str()).collect();
        known.push(format!("transport: {}", names.join(", ")));
    }
    known
}
