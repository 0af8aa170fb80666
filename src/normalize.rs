use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::extract_ssyk4;

pub const DEFAULT_SOURCE_TYPE: &str = "historical_api";

/// One persisted line of the harvested corpus.
///
/// Every field except `ssyk4` is copied from the API hit as-is; only a JSON
/// `null` (or a missing key) becomes `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAdRecord {
    pub id: Option<Value>,
    pub external_id: Option<Value>,
    pub headline: Option<Value>,
    pub employer_name: Option<Value>,
    pub publication_date: Option<Value>,
    pub last_publication_date: Option<Value>,
    pub application_deadline: Option<Value>,
    pub description: Option<Value>,
    pub must_have: Option<Value>,
    pub nice_to_have: Option<Value>,
    pub occupation: Option<Value>,
    pub salary_type: Option<Value>,
    pub duration: Option<Value>,
    pub salary_description: Option<Value>,
    pub workplace_address: Option<Value>,
    pub employment_type: Option<Value>,
    pub working_hours_type: Option<Value>,
    pub source_type: Value,
    pub ssyk4: Option<String>,
}

/// Map a raw API hit onto the corpus schema. Never fails: anything missing
/// becomes `None`.
pub fn normalize(ad: &Value) -> NormalizedAdRecord {
    let employer_name = ad
        .get("employer")
        .and_then(|employer| passthrough(employer, "name"));

    NormalizedAdRecord {
        id: passthrough(ad, "id"),
        external_id: passthrough(ad, "external_id"),
        headline: passthrough(ad, "headline"),
        employer_name,
        // legacy payloads only carry `published`
        publication_date: present(ad, "publication_date")
            .or_else(|| passthrough(ad, "published")),
        last_publication_date: passthrough(ad, "last_publication_date"),
        application_deadline: passthrough(ad, "application_deadline"),
        description: passthrough(ad, "description"),
        must_have: passthrough(ad, "must_have"),
        nice_to_have: passthrough(ad, "nice_to_have"),
        occupation: passthrough(ad, "occupation"),
        salary_type: passthrough(ad, "salary_type"),
        duration: passthrough(ad, "duration"),
        salary_description: passthrough(ad, "salary_description"),
        workplace_address: passthrough(ad, "workplace_address"),
        employment_type: passthrough(ad, "employment_type"),
        working_hours_type: passthrough(ad, "working_hours_type"),
        source_type: present(ad, "source_type")
            .unwrap_or_else(|| Value::String(DEFAULT_SOURCE_TYPE.to_string())),
        ssyk4: extract_ssyk4(ad.get("occupation")),
    }
}

fn passthrough(ad: &Value, key: &str) -> Option<Value> {
    ad.get(key).filter(|v| !v.is_null()).cloned()
}

/// Like `passthrough`, but empty values (`""`, `0`, `false`, `[]`, `{}`) also
/// count as missing so a fallback can apply.
fn present(ad: &Value, key: &str) -> Option<Value> {
    ad.get(key).filter(|v| !is_empty_value(v)).cloned()
}

pub(crate) fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
