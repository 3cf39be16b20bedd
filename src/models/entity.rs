//! Per-entity record written by the entities stage.

use serde_json::{json, Map, Value};

/// Entity types eligible for name translation.
pub const TRANSLATABLE_ENTITY_TYPES: [&str; 3] = ["PERSON", "LOCATION", "ORGANIZATION"];

/// Whether an entity of this type gets a translation sub-call.
pub fn is_translatable(entity_type: &str) -> bool {
    TRANSLATABLE_ENTITY_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(entity_type))
}

/// Character span of one mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionSpan {
    pub start: u64,
    pub end: u64,
}

/// Projection of one extracted entity.
///
/// Optional parts are omitted from the JSON form when unset, never written
/// as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub mention: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub count: u64,
    pub offsets: Option<Vec<MentionSpan>>,
    pub sentiment: Option<String>,
    pub translation: Option<String>,
}

impl From<EntityRecord> for Value {
    fn from(record: EntityRecord) -> Self {
        let mut map = Map::new();
        map.insert("mention".to_string(), Value::String(record.mention));
        map.insert("type".to_string(), Value::String(record.entity_type));
        if let Some(id) = record.entity_id {
            map.insert("entityId".to_string(), Value::String(id));
        }
        map.insert("count".to_string(), Value::from(record.count));
        if let Some(offsets) = record.offsets {
            let spans = offsets
                .into_iter()
                .map(|s| json!({"start": s.start, "end": s.end}))
                .collect();
            map.insert("offsets".to_string(), Value::Array(spans));
        }
        if let Some(sentiment) = record.sentiment {
            map.insert("sentiment".to_string(), Value::String(sentiment));
        }
        if let Some(translation) = record.translation {
            map.insert("translation".to_string(), Value::String(translation));
        }
        Value::Object(map)
    }
}
