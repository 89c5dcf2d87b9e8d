//! Permitted Daily Exposure calculation
//!
//! PDE = (effect dose x body weight) / (F1 x F2 x F3 x F4 x F5)
//!
//! | Factor | Accounts for                                   | Default            |
//! |--------|------------------------------------------------|--------------------|
//! | F1     | extrapolation between species                  | species table      |
//! | F2     | variability between individuals                | 10                 |
//! | F3     | short study duration                           | duration table     |
//! | F4     | severity of the effect                         | 1                  |
//! | F5     | NOAEL not established (LOAEL used instead)     | 1, or 10 for LOAEL |

use serde::{Deserialize, Serialize};

use crate::core::error::PdeError;
use crate::core::factors::{resolve_f1, resolve_f3};

/// Standard adult human body weight in kg
pub const DEFAULT_BODY_WEIGHT_KG: f64 = 50.0;

/// F5 floor applied to LOAEL-derived doses
pub const LOAEL_MIN_F5: f64 = 10.0;

/// Inputs for one PDE calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdeInputs {
    /// NOAEL or LOAEL in mg/kg/day
    pub effect_dose_mg_per_kg_day: f64,

    /// Human body weight in kg
    pub body_weight_kg: f64,

    /// Species key for the F1 table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    /// Explicit F1, takes precedence over `species`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1: Option<f64>,

    /// Variability between individuals
    pub f2: f64,

    /// Duration key for the F3 table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_key: Option<String>,

    /// Explicit F3, takes precedence over `duration_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f3: Option<f64>,

    /// Severity of the effect
    pub f4: f64,

    /// LOAEL uncertainty, before the floor in `effective_f5`
    pub f5: f64,

    /// The effect dose is a LOAEL rather than a NOAEL
    pub is_loael: bool,

    /// Raise F5 to at least 10 when `is_loael` is set
    pub enforce_default_loael_f5: bool,

    /// Free-text name of the substance or study
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PdeInputs {
    /// Inputs with every default filled in: 50 kg, rat, F2=10, duration "1", F4=F5=1, NOAEL
    pub fn new(effect_dose_mg_per_kg_day: f64) -> Self {
        Self {
            effect_dose_mg_per_kg_day,
            body_weight_kg: DEFAULT_BODY_WEIGHT_KG,
            species: Some("rat".to_string()),
            f1: None,
            f2: 10.0,
            duration_key: Some("1".to_string()),
            f3: None,
            f4: 1.0,
            f5: 1.0,
            is_loael: false,
            enforce_default_loael_f5: true,
            label: None,
        }
    }

    /// Inputs for a NOAEL-based calculation
    pub fn noael(noael_mg_per_kg_day: f64) -> Self {
        Self::new(noael_mg_per_kg_day)
    }

    /// Inputs for a LOAEL-based calculation (F5 defaults to 10)
    pub fn loael(loael_mg_per_kg_day: f64) -> Self {
        Self {
            f5: LOAEL_MIN_F5,
            is_loael: true,
            ..Self::new(loael_mg_per_kg_day)
        }
    }

    pub fn body_weight(mut self, kg: f64) -> Self {
        self.body_weight_kg = kg;
        self
    }

    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    /// Drop the species key so F1 must come from `f1`
    pub fn without_species(mut self) -> Self {
        self.species = None;
        self
    }

    pub fn f1(mut self, f1: f64) -> Self {
        self.f1 = Some(f1);
        self
    }

    pub fn f2(mut self, f2: f64) -> Self {
        self.f2 = f2;
        self
    }

    pub fn duration(mut self, key: impl Into<String>) -> Self {
        self.duration_key = Some(key.into());
        self
    }

    /// Drop the duration key so F3 must come from `f3`
    pub fn without_duration(mut self) -> Self {
        self.duration_key = None;
        self
    }

    pub fn f3(mut self, f3: f64) -> Self {
        self.f3 = Some(f3);
        self
    }

    pub fn f4(mut self, f4: f64) -> Self {
        self.f4 = f4;
        self
    }

    pub fn f5(mut self, f5: f64) -> Self {
        self.f5 = f5;
        self
    }

    pub fn is_loael(mut self, is_loael: bool) -> Self {
        self.is_loael = is_loael;
        self
    }

    pub fn enforce_loael_f5(mut self, enforce: bool) -> Self {
        self.enforce_default_loael_f5 = enforce;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn resolved_f1(&self) -> Result<f64, PdeError> {
        resolve_f1(self.species.as_deref(), self.f1)
    }

    pub fn resolved_f3(&self) -> Result<f64, PdeError> {
        resolve_f3(self.duration_key.as_deref(), self.f3)
    }

    /// F5 after the LOAEL floor
    pub fn effective_f5(&self) -> f64 {
        if self.is_loael && self.enforce_default_loael_f5 && self.f5 < LOAEL_MIN_F5 {
            LOAEL_MIN_F5
        } else {
            self.f5
        }
    }
}

/// Outcome of a PDE calculation with the factors actually used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdeResult {
    pub pde_mg_per_day: f64,
    pub f1: f64,
    pub f2: f64,
    pub f3: f64,
    pub f4: f64,
    pub f5: f64,
}

impl PdeResult {
    /// F1 x F2 x F3 x F4 x F5
    pub fn total_factor(&self) -> f64 {
        self.f1 * self.f2 * self.f3 * self.f4 * self.f5
    }

    /// Labelled values for display
    pub fn rows(&self) -> [(&'static str, f64); 6] {
        [
            ("PDE (mg/day)", self.pde_mg_per_day),
            ("F1", self.f1),
            ("F2", self.f2),
            ("F3", self.f3),
            ("F4", self.f4),
            ("F5", self.f5),
        ]
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), PdeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PdeError::NonPositive { field, value })
    }
}

/// Compute the PDE for fully specified inputs
///
/// Either returns a complete result or fails; no partial results.
pub fn compute_pde(inputs: &PdeInputs) -> Result<PdeResult, PdeError> {
    require_positive("effect_dose_mg_per_kg_day", inputs.effect_dose_mg_per_kg_day)?;
    require_positive("body_weight_kg", inputs.body_weight_kg)?;

    let f1 = inputs.resolved_f1()?;
    let f2 = inputs.f2;
    let f3 = inputs.resolved_f3()?;
    let f4 = inputs.f4;
    let f5 = inputs.effective_f5();

    let numerator = inputs.effect_dose_mg_per_kg_day * inputs.body_weight_kg;
    if !numerator.is_finite() {
        return Err(PdeError::Overflow { quantity: "numerator" });
    }
    let denominator = f1 * f2 * f3 * f4 * f5;
    if !denominator.is_finite() || denominator <= 0.0 {
        return Err(PdeError::InvalidDenominator { denominator });
    }
    let pde_mg_per_day = numerator / denominator;
    if !pde_mg_per_day.is_finite() {
        return Err(PdeError::Overflow { quantity: "PDE" });
    }

    Ok(PdeResult {
        pde_mg_per_day,
        f1,
        f2,
        f3,
        f4,
        f5,
    })
}
