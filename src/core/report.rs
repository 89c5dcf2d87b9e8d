//! Presentation view of a PDE calculation
//!
//! `PdeReport` is what both the HTTP API and the CLI emit: the PDE, the five
//! factors actually used, their product, and advisories derived from them.

use serde::Serialize;

use crate::core::pde::{PdeInputs, PdeResult, DEFAULT_BODY_WEIGHT_KG};

/// Caveats that apply to every PDE regardless of inputs
pub const GENERAL_CAVEATS: &[&str] = &[
    "PDE values qualify general systemic toxicity only - not local effects like irritation/sensitization",
    "Consider reproductive toxicity data separately if relevant to patient population",
    "PDE is a safety threshold, not an acceptable analytical limit",
];

/// Factor value at or above which an advisory is raised
const HIGH_FACTOR: f64 = 5.0;

/// Conditions in the inputs that deserve the reader's attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    LoaelBasis,
    ShortStudy,
    SevereToxicity,
    DataQuality,
    NonStandardBodyWeight,
}

impl Advisory {
    /// Advisories raised by a completed calculation
    pub fn collect(inputs: &PdeInputs, result: &PdeResult) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        if inputs.is_loael {
            advisories.push(Advisory::LoaelBasis);
        }
        if result.f3 >= HIGH_FACTOR {
            advisories.push(Advisory::ShortStudy);
        }
        if result.f4 >= HIGH_FACTOR {
            advisories.push(Advisory::SevereToxicity);
        }
        if result.f5 >= HIGH_FACTOR {
            advisories.push(Advisory::DataQuality);
        }
        if inputs.body_weight_kg != DEFAULT_BODY_WEIGHT_KG {
            advisories.push(Advisory::NonStandardBodyWeight);
        }
        advisories
    }

    pub fn message(&self) -> &'static str {
        match self {
            Advisory::LoaelBasis => "Calculation based on LOAEL rather than NOAEL - additional safety considerations may be needed",
            Advisory::ShortStudy => "Short-term study duration - may not adequately represent chronic exposure risks",
            Advisory::SevereToxicity => "Severe toxicity reported in animal studies - consider additional safety measures",
            Advisory::DataQuality => "Data quality concerns - consider additional studies or conservative interpretation",
            Advisory::NonStandardBodyWeight => "Non-standard body weight used - ensure appropriate for target population",
        }
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Serializable summary of one calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub pde: f64,
    pub f1: f64,
    pub f2: f64,
    pub f3: f64,
    pub f4: f64,
    pub f5: f64,
    #[serde(rename = "totalFactor")]
    pub total_factor: f64,
    pub warnings: Vec<String>,
}

impl PdeReport {
    pub fn new(inputs: &PdeInputs, result: &PdeResult) -> Self {
        Self {
            label: inputs.label.clone(),
            pde: result.pde_mg_per_day,
            f1: result.f1,
            f2: result.f2,
            f3: result.f3,
            f4: result.f4,
            f5: result.f5,
            total_factor: result.total_factor(),
            warnings: Advisory::collect(inputs, result)
                .iter()
                .map(|a| a.message().to_string())
                .collect(),
        }
    }
}

/// Two-line rendering of the substituted formula
pub fn formula_lines(inputs: &PdeInputs, result: &PdeResult) -> [String; 2] {
    let numerator = inputs.effect_dose_mg_per_kg_day * inputs.body_weight_kg;
    [
        format!(
            "PDE = ({} mg/kg/day × {} kg) ÷ ({} × {} × {} × {} × {})",
            inputs.effect_dose_mg_per_kg_day,
            inputs.body_weight_kg,
            result.f1,
            result.f2,
            result.f3,
            result.f4,
            result.f5
        ),
        format!(
            "PDE = {:.3} ÷ {} = {:.3} mg/day",
            numerator,
            result.total_factor(),
            result.pde_mg_per_day
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pde::compute_pde;

    #[test]
    fn test_report_for_plain_noael() {
        let inputs = PdeInputs::noael(50.0);
        let result = compute_pde(&inputs).unwrap();
        let report = PdeReport::new(&inputs, &result);

        assert_eq!(report.pde, 50.0);
        assert_eq!(report.total_factor, 50.0);
        assert!(report.warnings.is_empty());
        assert!(report.label.is_none());
    }

    #[test]
    fn test_total_factor_matches_factor_product() {
        let inputs = PdeInputs::loael(10.0)
            .species("rabbit")
            .duration("10")
            .f4(5.0);
        let result = compute_pde(&inputs).unwrap();
        let report = PdeReport::new(&inputs, &result);
        assert_eq!(
            report.total_factor,
            report.f1 * report.f2 * report.f3 * report.f4 * report.f5
        );
    }

    #[test]
    fn test_advisories_for_loael_short_study() {
        let inputs = PdeInputs::loael(10.0)
            .species("rabbit")
            .duration("10")
            .f4(5.0)
            .body_weight(70.0);
        let result = compute_pde(&inputs).unwrap();

        assert_eq!(
            Advisory::collect(&inputs, &result),
            vec![
                Advisory::LoaelBasis,
                Advisory::ShortStudy,
                Advisory::SevereToxicity,
                Advisory::DataQuality,
                Advisory::NonStandardBodyWeight,
            ]
        );
    }

    #[test]
    fn test_report_json_shape() {
        let inputs = PdeInputs::noael(50.0).label("Benzyl alcohol");
        let result = compute_pde(&inputs).unwrap();
        let json = serde_json::to_value(PdeReport::new(&inputs, &result)).unwrap();

        assert_eq!(json["label"], "Benzyl alcohol");
        assert_eq!(json["pde"], 50.0);
        assert_eq!(json["totalFactor"], 50.0);
        assert!(json.get("total_factor").is_none());
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_formula_lines() {
        let inputs = PdeInputs::noael(50.0);
        let result = compute_pde(&inputs).unwrap();
        let [first, second] = formula_lines(&inputs, &result);

        insta::assert_snapshot!(first, @"PDE = (50 mg/kg/day × 50 kg) ÷ (5 × 10 × 1 × 1 × 1)");
        insta::assert_snapshot!(second, @"PDE = 2500.000 ÷ 50 = 50.000 mg/day");
    }
}
