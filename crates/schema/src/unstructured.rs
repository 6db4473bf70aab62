//! Helpers for the free-form JSON payload of the unstructured generations.
//!
//! Legacy dashboards were produced by many editor versions, so field typing
//! is loose: booleans arrive as `true`, `"true"`, or `1`; numbers arrive as
//! numbers or numeric strings. The accessors here tolerate all of that.

use serde_json::{Map, Value};

/// Ordered-key JSON mapping used as the spec payload of `V0` and `V1`.
pub type UnstructuredSpec = Map<String, Value>;

/// String field, `None` when missing or not a string.
pub fn get_str<'a>(map: &'a UnstructuredSpec, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// String field with a default for missing/non-string values.
pub fn get_string_or(map: &UnstructuredSpec, key: &str, default: &str) -> String {
    get_str(map, key).unwrap_or(default).to_string()
}

/// Boolean field, accepting `bool`, `"true"`/`"false"`, and 0/1 numbers.
pub fn get_bool(map: &UnstructuredSpec, key: &str, default: bool) -> bool {
    match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.as_str() {
            "true" => true,
            "false" => false,
            _ => default,
        },
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(default),
        _ => default,
    }
}

/// Integer field, accepting numbers and numeric strings.
pub fn get_i64(map: &UnstructuredSpec, key: &str, default: i64) -> i64 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(default),
        Some(Value::String(s)) => s.parse().unwrap_or(default),
        _ => default,
    }
}

/// Nested object field.
pub fn get_map<'a>(map: &'a UnstructuredSpec, key: &str) -> Option<&'a UnstructuredSpec> {
    map.get(key).and_then(Value::as_object)
}

/// Array field.
pub fn get_array<'a>(map: &'a UnstructuredSpec, key: &str) -> Option<&'a Vec<Value>> {
    map.get(key).and_then(Value::as_array)
}

/// Numbered schema version embedded in a legacy payload, 0 when absent.
pub fn schema_version(map: &UnstructuredSpec) -> u32 {
    get_i64(map, "schemaVersion", 0).max(0) as u32
}

/// Whether a datasource reference string is a template-variable placeholder
/// (`$name` or `${name}`). Such references are opaque and never resolved
/// against the catalog.
pub fn is_template_variable(uid: &str) -> bool {
    uid.starts_with('$')
}

/// Strips a UTF-8 byte-order mark some imported dashboards carry on URLs.
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> UnstructuredSpec {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_bool_tolerates_strings_and_numbers() {
        let map = payload(json!({"a": true, "b": "true", "c": 1, "d": 0, "e": "nope"}));
        assert!(get_bool(&map, "a", false));
        assert!(get_bool(&map, "b", false));
        assert!(get_bool(&map, "c", false));
        assert!(!get_bool(&map, "d", true));
        assert!(get_bool(&map, "e", true));
        assert!(!get_bool(&map, "missing", false));
    }

    #[test]
    fn test_i64_tolerates_numeric_strings() {
        let map = payload(json!({"a": 7, "b": "12", "c": 3.9, "d": "x"}));
        assert_eq!(get_i64(&map, "a", 0), 7);
        assert_eq!(get_i64(&map, "b", 0), 12);
        assert_eq!(get_i64(&map, "c", 0), 3);
        assert_eq!(get_i64(&map, "d", 5), 5);
    }

    #[test]
    fn test_schema_version_defaults_to_zero() {
        assert_eq!(schema_version(&payload(json!({}))), 0);
        assert_eq!(schema_version(&payload(json!({"schemaVersion": 39}))), 39);
        assert_eq!(schema_version(&payload(json!({"schemaVersion": "41"}))), 41);
    }

    #[test]
    fn test_template_variable_detection() {
        assert!(is_template_variable("$ds"));
        assert!(is_template_variable("${ds}"));
        assert!(!is_template_variable("abc123"));
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{feff}https://example.com"), "https://example.com");
        assert_eq!(strip_bom("https://example.com"), "https://example.com");
    }
}
