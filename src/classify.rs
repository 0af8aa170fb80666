//! SSYK4 occupation code extraction.
//!
//! The historical API is inconsistent about the `occupation` field: it is usually
//! an object, sometimes a list of objects, sometimes missing altogether.

use serde_json::{Map, Value};

/// Taxonomy id used by the historical API.
const PRIMARY_CODE_KEY: &str = "legacy_ams_taxonomy_id";
const FALLBACK_CODE_KEY: &str = "ssyk";

/// The shapes `occupation` is seen in.
#[derive(Debug, Clone, Copy)]
pub enum OccupationShape<'a> {
    Mapping(&'a Map<String, Value>),
    /// Non-empty list; only the first element is consulted.
    Sequence(&'a [Value]),
    Absent,
}

impl<'a> OccupationShape<'a> {
    pub fn of(field: Option<&'a Value>) -> Self {
        match field {
            Some(Value::Object(map)) => OccupationShape::Mapping(map),
            Some(Value::Array(items)) if !items.is_empty() => OccupationShape::Sequence(items),
            _ => OccupationShape::Absent,
        }
    }

    /// The mapping the code (or label) should be read from, if any.
    pub fn mapping(self) -> Option<&'a Map<String, Value>> {
        match self {
            OccupationShape::Mapping(map) => Some(map),
            OccupationShape::Sequence(items) => items.first().and_then(Value::as_object),
            OccupationShape::Absent => None,
        }
    }
}

/// Derive the 4-character SSYK code from a raw `occupation` field.
pub fn extract_ssyk4(occupation: Option<&Value>) -> Option<String> {
    let map = OccupationShape::of(occupation).mapping()?;
    let code = scalar_text(map.get(PRIMARY_CODE_KEY))
        .or_else(|| scalar_text(map.get(FALLBACK_CODE_KEY)))?;
    Some(code.chars().take(4).collect())
}

/// Read a code as text. Empty strings, zero, null and structured values count as
/// missing, so the fallback key gets a chance.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}
