//! Coercion of the `/api/calculate` JSON body into typed inputs
//!
//! Numeric fields accept JSON numbers or numeric strings. `null` counts as
//! absent so that an empty form field falls back to its default.
//!
//! `f3` is overloaded on the wire. A number is an explicit F3. A string is the
//! duration key unless `durationKey` is also present, in which case it is read
//! as a number.

use serde_json::{Map, Value};

use crate::core::error::PdeError;
use crate::core::pde::PdeInputs;

/// Fields recognised in the request body
pub const FIELDS: &[&str] = &[
    "noael",
    "humanWeight",
    "species",
    "f1",
    "f2",
    "f3",
    "durationKey",
    "f4",
    "f5",
    "doseType",
    "enforceLoaelF5",
    "label",
];

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
        other => other.to_string(),
    }
}

fn mismatch(field: &'static str, expected: &'static str, value: &Value) -> PdeError {
    PdeError::TypeCoercion {
        field,
        expected,
        found: describe(value),
    }
}

fn present<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

/// Parse a numeric string, allowing `_` between digits ("1_000")
fn parse_float(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if !s.contains('_') {
        return s.parse().ok();
    }
    let bytes = s.as_bytes();
    let grouped = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !grouped {
        return None;
    }
    s.replace('_', "").parse().ok()
}

/// Read a numeric field the way Python's `float()` would
fn number(body: &Map<String, Value>, field: &'static str) -> Result<Option<f64>, PdeError> {
    let Some(value) = present(body, field) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float(s),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(mismatch(field, "a finite number", value)),
    }
}

fn number_or(body: &Map<String, Value>, field: &'static str, default: f64) -> Result<f64, PdeError> {
    Ok(number(body, field)?.unwrap_or(default))
}

fn text(body: &Map<String, Value>, field: &'static str) -> Result<Option<String>, PdeError> {
    match present(body, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(mismatch(field, "a string", other)),
    }
}

/// Read a lookup key, accepting integers written as numbers
fn key(body: &Map<String, Value>, field: &'static str) -> Result<Option<String>, PdeError> {
    match present(body, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(mismatch(field, "a string or number", other)),
    }
}

fn flag(body: &Map<String, Value>, field: &'static str) -> Result<Option<bool>, PdeError> {
    match present(body, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(mismatch(field, "a boolean", other)),
    }
}

/// Build calculation inputs from a decoded request body
pub fn inputs_from_json(body: &Map<String, Value>) -> Result<PdeInputs, PdeError> {
    let dose = number(body, "noael")?.ok_or(PdeError::MissingField { field: "noael" })?;

    let mut inputs = PdeInputs::new(dose)
        .body_weight(number_or(body, "humanWeight", 50.0)?)
        .f2(number_or(body, "f2", 10.0)?)
        .f4(number_or(body, "f4", 1.0)?)
        .f5(number_or(body, "f5", 1.0)?);

    if let Some(species) = text(body, "species")? {
        inputs = inputs.species(species);
    }
    if let Some(f1) = number(body, "f1")? {
        inputs = inputs.f1(f1);
    }

    match (key(body, "durationKey")?, present(body, "f3")) {
        (None, Some(Value::String(legacy_key))) => {
            inputs = inputs.duration(legacy_key.clone());
        }
        (duration_key, _) => {
            if let Some(k) = duration_key {
                inputs = inputs.duration(k);
            }
            if let Some(f3) = number(body, "f3")? {
                inputs = inputs.f3(f3);
            }
        }
    }

    let dose_type = text(body, "doseType")?.unwrap_or_else(|| "noael".to_string());
    inputs = inputs.is_loael(dose_type.trim().eq_ignore_ascii_case("loael"));

    if let Some(enforce) = flag(body, "enforceLoaelF5")? {
        inputs = inputs.enforce_loael_f5(enforce);
    }
    if let Some(label) = text(body, "label")? {
        inputs = inputs.label(label);
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<PdeInputs, PdeError> {
        match value {
            Value::Object(map) => inputs_from_json(&map),
            other => panic!("test body must be an object, got {other}"),
        }
    }

    #[test]
    fn test_defaults() {
        let inputs = parse(json!({ "noael": 50 })).unwrap();
        assert_eq!(inputs, PdeInputs::new(50.0));
    }

    #[test]
    fn test_missing_noael() {
        assert_eq!(
            parse(json!({ "species": "rat" })),
            Err(PdeError::MissingField { field: "noael" })
        );
        assert_eq!(
            parse(json!({ "noael": null })),
            Err(PdeError::MissingField { field: "noael" })
        );
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let inputs = parse(json!({ "noael": " 12.5 ", "humanWeight": "60", "f2": "5" })).unwrap();
        assert_eq!(inputs.effect_dose_mg_per_kg_day, 12.5);
        assert_eq!(inputs.body_weight_kg, 60.0);
        assert_eq!(inputs.f2, 5.0);
    }

    #[test]
    fn test_digit_grouping_underscores() {
        assert_eq!(parse_float("1_000"), Some(1000.0));
        assert_eq!(parse_float(" 2_500.5 "), Some(2500.5));
        assert_eq!(parse_float("1e1_0"), Some(1e10));
        assert_eq!(parse_float("_1000"), None);
        assert_eq!(parse_float("1000_"), None);
        assert_eq!(parse_float("1__000"), None);
        assert_eq!(parse_float("1_.5"), None);

        let inputs = parse(json!({ "noael": "1_000" })).unwrap();
        assert_eq!(inputs.effect_dose_mg_per_kg_day, 1000.0);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = parse(json!({ "noael": 10, "f4": "severe" })).unwrap_err();
        assert_eq!(
            err,
            PdeError::TypeCoercion {
                field: "f4",
                expected: "a finite number",
                found: "'severe'".to_string()
            }
        );
        assert!(matches!(
            parse(json!({ "noael": true })),
            Err(PdeError::TypeCoercion { field: "noael", .. })
        ));
        assert!(matches!(
            parse(json!({ "noael": "nan" })),
            Err(PdeError::TypeCoercion { field: "noael", .. })
        ));
    }

    #[test]
    fn test_null_means_default() {
        let inputs = parse(json!({ "noael": 10, "humanWeight": null, "f2": null })).unwrap();
        assert_eq!(inputs.body_weight_kg, 50.0);
        assert_eq!(inputs.f2, 10.0);
    }

    #[test]
    fn test_species_must_be_text() {
        assert!(matches!(
            parse(json!({ "noael": 10, "species": 5 })),
            Err(PdeError::TypeCoercion { field: "species", expected: "a string", .. })
        ));
    }

    #[test]
    fn test_string_f3_is_duration_key() {
        let inputs = parse(json!({ "noael": 10, "f3": "10" })).unwrap();
        assert_eq!(inputs.duration_key.as_deref(), Some("10"));
        assert_eq!(inputs.f3, None);
    }

    #[test]
    fn test_numeric_f3_is_override() {
        let inputs = parse(json!({ "noael": 10, "f3": 3 })).unwrap();
        assert_eq!(inputs.duration_key.as_deref(), Some("1"));
        assert_eq!(inputs.f3, Some(3.0));
    }

    #[test]
    fn test_duration_key_with_string_f3_override() {
        let inputs = parse(json!({ "noael": 10, "durationKey": 5, "f3": "2.5" })).unwrap();
        assert_eq!(inputs.duration_key.as_deref(), Some("5"));
        assert_eq!(inputs.f3, Some(2.5));
    }

    #[test]
    fn test_dose_type() {
        assert!(parse(json!({ "noael": 10, "doseType": "loael" })).unwrap().is_loael);
        assert!(parse(json!({ "noael": 10, "doseType": " LOAEL " })).unwrap().is_loael);
        assert!(!parse(json!({ "noael": 10, "doseType": "noael" })).unwrap().is_loael);
        assert!(!parse(json!({ "noael": 10, "doseType": "other" })).unwrap().is_loael);
    }

    #[test]
    fn test_optional_extras() {
        let inputs = parse(json!({
            "noael": 10,
            "f1": 7,
            "enforceLoaelF5": false,
            "label": "Maleic anhydride"
        }))
        .unwrap();
        assert_eq!(inputs.f1, Some(7.0));
        assert!(!inputs.enforce_default_loael_f5);
        assert_eq!(inputs.label.as_deref(), Some("Maleic anhydride"));
    }

    #[test]
    fn test_flag_must_be_boolean() {
        assert!(matches!(
            parse(json!({ "noael": 10, "enforceLoaelF5": "yes" })),
            Err(PdeError::TypeCoercion { field: "enforceLoaelF5", .. })
        ));
    }
}
