//! Parse LLM output into an entity update

use crate::error::ExtractionServiceError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;
use voyage_domain::{EntityUpdate, TransportKind};

/// Parse the LLM JSON response into an entity update
///
/// The response must be a single JSON object. Unknown keys are ignored; a
/// known key with the wrong type rejects the whole response.
pub fn parse_llm_response(response: &str) -> Result<EntityUpdate, ExtractionServiceError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)?;
    let obj = json.as_object().ok_or_else(|| {
        ExtractionServiceError::MalformedResponse("Expected JSON object".to_string())
    })?;

    let update = EntityUpdate {
        date: string_field(obj, "date")?,
        start_city: string_field(obj, "start_city")?,
        end_city: string_field(obj, "end_city")?,
        mid_city: city_list(obj)?,
        prefered_transport: transport_flags(obj)?,
    };

    debug!(?update, "Parsed extraction response");
    Ok(update)
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractionServiceError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractionServiceError::MalformedResponse(
                "Empty code block".to_string(),
            ));
        }

        // Skip the opening fence line and a closing fence if present
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn malformed(field: &str, expected: &str) -> ExtractionServiceError {
    ExtractionServiceError::MalformedResponse(format!("'{}' must be {}", field, expected))
}

fn string_field(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, ExtractionServiceError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(malformed(field, "a string")),
    }
}

fn city_list(obj: &Map<String, Value>) -> Result<Option<Vec<String>>, ExtractionServiceError> {
    match obj.get("mid_city") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed("mid_city", "a list of strings"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(malformed("mid_city", "a list of strings")),
    }
}

fn transport_flags(
    obj: &Map<String, Value>,
) -> Result<BTreeMap<TransportKind, bool>, ExtractionServiceError> {
    let mut flags = BTreeMap::new();
    let map = match obj.get("prefered_transport") {
        None | Some(Value::Null) => return Ok(flags),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(malformed("prefered_transport", "an object")),
    };

    for (key, value) in map {
        let kind = match TransportKind::parse(key) {
            Some(kind) if kind.is_preferable() => kind,
            _ => continue,
        };
        let selected = match value {
            Value::Bool(b) => *b,
            Value::Number(n) => match n.as_u64() {
                Some(0) => false,
                Some(1) => true,
                _ => return Err(malformed("prefered_transport", "0/1 or true/false flags")),
            },
            _ => return Err(malformed("prefered_transport", "0/1 or true/false flags")),
        };
        flags.insert(kind, selected);
    }

    Ok(flags)
}
