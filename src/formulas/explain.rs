//! Static formula descriptions for "explain the math" requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub calculation_type: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationResult {
    pub explanation: String,
}

const EXPLANATIONS: &[(&str, &str)] = &[
    (
        "future_value",
        "Future Value calculation uses compound interest: FV = PV × (1 + r)^n",
    ),
    (
        "present_value",
        "Present Value discounts future money to today's value: PV = FV ÷ (1 + r)^n",
    ),
    (
        "rule_of_72",
        "Rule of 72 estimates doubling time: Years ≈ 72 ÷ (interest rate %)",
    ),
    (
        "fv_annuity",
        "Future Value of Annuity: FV = PMT × [((1 + r)^n - 1) ÷ r]",
    ),
    (
        "pv_annuity",
        "Present Value of Annuity: PV = PMT × [1 - (1 + r)^(-n)] ÷ r",
    ),
    ("nper", "Number of Periods: n = ln(FV/PV) ÷ ln(1 + r)"),
];

/// Describe a calculation type. Total: unknown types get a generic line.
pub fn explain_calculation(calculation_type: &str, parameters: &Value) -> String {
    let explanation = EXPLANATIONS
        .iter()
        .find(|(key, _)| *key == calculation_type)
        .map(|(_, text)| (*text).to_string())
        .unwrap_or_else(|| format!("Explanation for {}", calculation_type));

    format!("{}\nParameters used: {}", explanation, parameters)
}

impl ExplanationRequest {
    pub fn explain(&self) -> ExplanationResult {
        ExplanationResult {
            explanation: explain_calculation(&self.calculation_type, &self.parameters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulas::FormulaId;
    use serde_json::json;

    #[test]
    fn test_every_formula_has_an_entry() {
        for id in FormulaId::ALL {
            let text = explain_calculation(id.as_str(), &json!({}));
            assert!(!text.starts_with("Explanation for"), "{}", id);
        }
    }

    #[test]
    fn test_explain_future_value() {
        let text = explain_calculation("future_value", &json!({"pv": 1000, "r": 0.05, "n": 10}));
        assert!(text.contains("FV = PV × (1 + r)^n"));
        assert!(text.contains("compound interest"));
        assert!(text.to_lowercase().contains("pv"));
    }

    #[test]
    fn test_explain_formulas_text() {
        assert!(explain_calculation("present_value", &json!({})).contains("discounts future money"));
        assert!(explain_calculation("rule_of_72", &json!({})).contains("72 ÷"));
        assert!(explain_calculation("fv_annuity", &json!({})).contains("((1 + r)^n - 1)"));
        assert!(explain_calculation("pv_annuity", &json!({})).contains("(1 + r)^(-n)"));

        let nper = explain_calculation("nper", &json!({"pv": 1000, "fv": 2000, "r": 0.05}));
        assert!(nper.contains("ln(FV/PV)"));
        assert!(nper.contains("ln(1 + r)"));
    }

    #[test]
    fn test_explain_unknown_type() {
        let text = explain_calculation("unknown_x", &json!({}));
        assert!(text.contains("unknown_x"));
        assert!(text.contains("Explanation for unknown_x"));
        assert!(text.contains("Parameters used:"));
    }

    #[test]
    fn test_explain_echoes_parameters() {
        let request = ExplanationRequest {
            calculation_type: "unknown_calculation".to_string(),
            parameters: json!({"test": "value"}),
        };
        let result = request.explain();
        assert!(result.explanation.ends_with(r#"Parameters used: {"test":"value"}"#));
    }
}
