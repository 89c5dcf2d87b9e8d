//! Calculation errors with diagnostic codes

use miette::Diagnostic;
use thiserror::Error;

/// Every way a PDE calculation can be rejected
///
/// The `Display` text is what the HTTP boundary returns in `{"error": ...}`,
/// so it must stay free of internal detail.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum PdeError {
    /// Neither the lookup key nor the explicit factor was supplied
    #[error("Provide '{key}' or explicit {factor}")]
    #[diagnostic(code(pdecalc::missing_parameter))]
    MissingParameter {
        key: &'static str,
        factor: &'static str,
    },

    #[error("Unknown species '{value}'. Known: {}", .known.join(", "))]
    #[diagnostic(
        code(pdecalc::unknown_species),
        help("Use one of the listed species, or pass an explicit F1 instead")
    )]
    UnknownSpecies {
        value: String,
        known: Vec<&'static str>,
    },

    #[error("Unknown duration_key '{value}'. Known: {}", .known.join(", "))]
    #[diagnostic(
        code(pdecalc::unknown_duration_key),
        help("Use one of the listed duration keys, or pass an explicit F3 instead")
    )]
    UnknownDurationKey {
        value: String,
        known: Vec<&'static str>,
    },

    #[error("Composite denominator must be finite and > 0 (F1 x F2 x F3 x F4 x F5 = {denominator})")]
    #[diagnostic(
        code(pdecalc::invalid_denominator),
        help("Every adjustment factor must be a positive number")
    )]
    InvalidDenominator { denominator: f64 },

    /// An intermediate value or the PDE itself left the range of f64
    #[error("PDE calculation overflowed: {quantity} is not a finite number")]
    #[diagnostic(
        code(pdecalc::overflow),
        help("Check the units of the dose, body weight and factors")
    )]
    Overflow { quantity: &'static str },

    /// A required input with no default was not supplied
    #[error("Missing required field '{field}'")]
    #[diagnostic(code(pdecalc::missing_parameter))]
    MissingField { field: &'static str },

    #[error("Field '{field}' must be {expected}, got {found}")]
    #[diagnostic(code(pdecalc::type_coercion))]
    TypeCoercion {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("'{field}' must be greater than zero, got {value}")]
    #[diagnostic(code(pdecalc::non_positive))]
    NonPositive { field: &'static str, value: f64 },
}

impl PdeError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PdeError::MissingParameter { .. } | PdeError::MissingField { .. } => {
                "missing_parameter"
            }
            PdeError::UnknownSpecies { .. } => "unknown_species",
            PdeError::UnknownDurationKey { .. } => "unknown_duration_key",
            PdeError::InvalidDenominator { .. } => "invalid_denominator",
            PdeError::Overflow { .. } => "overflow",
            PdeError::TypeCoercion { .. } => "type_coercion",
            PdeError::NonPositive { .. } => "non_positive",
        }
    }
}
