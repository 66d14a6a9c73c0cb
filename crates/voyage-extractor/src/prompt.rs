//! LLM prompt engineering for slot extraction

use serde_json::{json, Map, Value};
use voyage_domain::TravelEntities;

/// Builds prompts for the LLM to extract travel slots
pub struct PromptBuilder {
    dialogue: String,
    current: Value,
}

impl PromptBuilder {
    /// Create a new prompt builder over the dialogue transcript
    pub fn new(dialogue: impl Into<String>) -> Self {
        Self {
            dialogue: dialogue.into(),
            current: entities_json(&TravelEntities::default()),
        }
    }

    /// Add the slots already known, so the model keeps them
    pub fn with_current(mut self, current: &TravelEntities) -> Self {
        self.current = entities_json(current);
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Task and slot definitions
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. What is already known
        prompt.push_str("Currently known values:\n");
        prompt.push_str(&format!("{:#}", self.current));
        prompt.push_str("\n\n");

        // 3. The dialogue to analyze
        prompt.push_str("User messages so far:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.dialogue);
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

/// Render entities in the wire shape the model answers in
pub fn entities_json(entities: &TravelEntities) -> Value {
    let mut transport = Map::new();
    for (kind, selected) in entities.preferred_transport.flags() {
        transport.insert(kind.as_str().to_string(), json!(u8::from(selected)));
    }

    json!({
        "date": entities.date,
        "start_city": entities.start_city,
        "end_city": entities.end_city,
        "mid_city": entities.mid_city,
        "prefered_transport": transport,
    })
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You extract travel details from a conversation with a traveller.
Fill these fields:

- date: travel date in format dd.mm.yyyy
- start_city: city of departure
- end_city: city of arrival
- mid_city: list of intermediate cities (may be empty)
- prefered_transport: object with keys "train", "plane", "bus", each 1 if the
  traveller asked for that transport and 0 if they refused it

Rules:
- Take only what the traveller stated explicitly
- Change a field only if the messages mention it
- If a field is already known and not mentioned, return the known value
- If a field is unknown and not mentioned, return "" (or [] for mid_city)
- Write city names the way the traveller wrote them"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (one JSON object only, no additional text):
{
  "date": "dd.mm.yyyy",
  "start_city": "departure city",
  "end_city": "arrival city",
  "mid_city": ["intermediate city 1", "intermediate city 2"],
  "prefered_transport": {"train": 0, "plane": 0, "bus": 0}
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
