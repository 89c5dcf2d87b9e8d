//! Default adjustment factor tables and resolution
//!
//! F1 (interspecies extrapolation) and F3 (study duration) can each be given
//! directly or looked up by key. An explicit value always wins over the table.

use crate::core::error::PdeError;

/// F1 by test species, scaled by body surface area relative to humans
pub const SPECIES_F1: &[(&str, f64)] = &[
    ("mouse", 12.0),
    ("rat", 5.0),
    ("rabbit", 2.5),
    ("dog", 2.0),
    ("monkey", 1.5),
    ("human", 1.0),
];

/// F3 by duration key
pub const DURATION_F3: &[(&str, f64)] = &[
    ("1", 1.0),
    ("2", 2.0),
    ("5", 5.0),
    ("10", 10.0),
];

/// Species keys in table order
pub fn species_keys() -> Vec<&'static str> {
    SPECIES_F1.iter().map(|(k, _)| *k).collect()
}

/// Duration keys in table order
pub fn duration_keys() -> Vec<&'static str> {
    DURATION_F3.iter().map(|(k, _)| *k).collect()
}

fn lookup(table: &[(&'static str, f64)], raw: &str) -> Option<f64> {
    let key = raw.trim().to_lowercase();
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Resolve F1 from an explicit override or the species table
pub fn resolve_f1(species: Option<&str>, explicit_f1: Option<f64>) -> Result<f64, PdeError> {
    if let Some(f1) = explicit_f1 {
        return Ok(f1);
    }
    let species = species.ok_or(PdeError::MissingParameter {
        key: "species",
        factor: "f1",
    })?;
    lookup(SPECIES_F1, species).ok_or_else(|| PdeError::UnknownSpecies {
        value: species.to_string(),
        known: species_keys(),
    })
}

/// Resolve F3 from an explicit override or the duration table
pub fn resolve_f3(duration_key: Option<&str>, explicit_f3: Option<f64>) -> Result<f64, PdeError> {
    if let Some(f3) = explicit_f3 {
        return Ok(f3);
    }
    let key = duration_key.ok_or(PdeError::MissingParameter {
        key: "duration_key",
        factor: "f3",
    })?;
    lookup(DURATION_F3, key).ok_or_else(|| PdeError::UnknownDurationKey {
        value: key.to_string(),
        known: duration_keys(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_table_values() {
        assert_eq!(resolve_f1(Some("mouse"), None), Ok(12.0));
        assert_eq!(resolve_f1(Some("rat"), None), Ok(5.0));
        assert_eq!(resolve_f1(Some("rabbit"), None), Ok(2.5));
        assert_eq!(resolve_f1(Some("dog"), None), Ok(2.0));
        assert_eq!(resolve_f1(Some("monkey"), None), Ok(1.5));
        assert_eq!(resolve_f1(Some("human"), None), Ok(1.0));
    }

    #[test]
    fn test_species_key_is_normalized() {
        assert_eq!(resolve_f1(Some("  Rat "), None), Ok(5.0));
        assert_eq!(resolve_f1(Some("MOUSE"), None), Ok(12.0));
    }

    #[test]
    fn test_unknown_species() {
        let err = resolve_f1(Some("unknown_animal"), None).unwrap_err();
        match err {
            PdeError::UnknownSpecies { value, known } => {
                assert_eq!(value, "unknown_animal");
                assert_eq!(known, species_keys());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_species_is_unknown() {
        assert!(matches!(
            resolve_f1(Some(""), None),
            Err(PdeError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn test_missing_species() {
        assert_eq!(
            resolve_f1(None, None),
            Err(PdeError::MissingParameter {
                key: "species",
                factor: "f1"
            })
        );
    }

    #[test]
    fn test_explicit_f1_wins() {
        assert_eq!(resolve_f1(Some("rat"), Some(7.0)), Ok(7.0));
        assert_eq!(resolve_f1(Some("unknown_animal"), Some(3.0)), Ok(3.0));
        assert_eq!(resolve_f1(None, Some(0.0)), Ok(0.0));
    }

    #[test]
    fn test_duration_table_values() {
        assert_eq!(resolve_f3(Some("1"), None), Ok(1.0));
        assert_eq!(resolve_f3(Some("2"), None), Ok(2.0));
        assert_eq!(resolve_f3(Some(" 5 "), None), Ok(5.0));
        assert_eq!(resolve_f3(Some("10"), None), Ok(10.0));
    }

    #[test]
    fn test_unknown_duration_key() {
        for key in ["3", "10.0", "chronic", ""] {
            assert!(
                matches!(
                    resolve_f3(Some(key), None),
                    Err(PdeError::UnknownDurationKey { .. })
                ),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_explicit_f3_wins() {
        assert_eq!(resolve_f3(Some("chronic"), Some(10.0)), Ok(10.0));
        assert_eq!(resolve_f3(None, Some(2.0)), Ok(2.0));
    }

    #[test]
    fn test_missing_duration_key() {
        assert_eq!(
            resolve_f3(None, None),
            Err(PdeError::MissingParameter {
                key: "duration_key",
                factor: "f3"
            })
        );
    }

    #[test]
    fn test_tables_are_strictly_positive() {
        assert!(SPECIES_F1.iter().all(|(_, v)| *v > 0.0));
        assert!(DURATION_F3.iter().all(|(_, v)| *v > 0.0));
    }
}
