//! Shape checks for raw, untyped specification input.
//!
//! This is the only place that looks at loosely-typed values. Everything
//! downstream works on the typed specification.

use serde_json::Value;

/// Returns the observed-type token used in diagnostics.
///
/// `None` stands for an absent field and renders as `Undefined`.
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "Undefined",
        Some(Value::Null) => "Null",
        Some(Value::Bool(_)) => "Boolean",
        Some(Value::Number(_)) => "Number",
        Some(Value::String(_)) => "String",
        Some(Value::Array(_)) => "Array",
        Some(Value::Object(_)) => "Object",
    }
}

/// Objects and arrays can be walked as key/value mappings.
pub fn is_object_like(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Values that count as "not given" when defaulting optional mappings.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Key/value entries of an object-like value.
///
/// Arrays are keyed by their indices. Any other value has no entries.
pub fn entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(None), "Undefined");
        assert_eq!(type_name(Some(&json!(null))), "Null");
        assert_eq!(type_name(Some(&json!(true))), "Boolean");
        assert_eq!(type_name(Some(&json!(1.5))), "Number");
        assert_eq!(type_name(Some(&json!(""))), "String");
        assert_eq!(type_name(Some(&json!([]))), "Array");
        assert_eq!(type_name(Some(&json!({}))), "Object");
    }

    #[test]
    fn test_falsy() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!(1)));
        assert!(!is_falsy(&json!("x")));
        assert!(!is_falsy(&json!({})));
        assert!(!is_falsy(&json!([])));
    }

    #[test]
    fn test_array_entries_use_indices() {
        let value = json!(["a", "b"]);
        let entries = entries(&value);
        assert_eq!(entries[0].0, "0");
        assert_eq!(entries[1], ("1".to_string(), &json!("b")));
        assert!(super::entries(&json!("text")).is_empty());
    }
}
