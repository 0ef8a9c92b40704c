//! Financial formula library
//!
//! Closed-form compound-interest calculations. Every operation is a pure
//! function of its inputs: no I/O, no shared state, no retries. Each one
//! either returns a complete [`CalculationResult`] or fails with a
//! [`PlannerError`] describing the domain or validation problem.

use crate::error::PlannerError;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod annuity;
pub mod compound;
pub mod explain;
mod format;

pub use annuity::{fv_annuity, pv_annuity};
pub use compound::{future_value, nper, present_value, rule_of_72};
pub use explain::explain_calculation;

/// The closed set of supported calculations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FormulaId {
    FutureValue,
    PresentValue,
    RuleOf72,
    FvAnnuity,
    PvAnnuity,
    Nper,
}

impl FormulaId {
    pub const ALL: [FormulaId; 6] = [
        FormulaId::FutureValue,
        FormulaId::PresentValue,
        FormulaId::RuleOf72,
        FormulaId::FvAnnuity,
        FormulaId::PvAnnuity,
        FormulaId::Nper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaId::FutureValue => "future_value",
            FormulaId::PresentValue => "present_value",
            FormulaId::RuleOf72 => "rule_of_72",
            FormulaId::FvAnnuity => "fv_annuity",
            FormulaId::PvAnnuity => "pv_annuity",
            FormulaId::Nper => "nper",
        }
    }
}

impl fmt::Display for FormulaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormulaId {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        FormulaId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PlannerError::UnknownFormula(s.to_string()))
    }
}

/// A named calculation with its raw, not yet validated inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub formula_id: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Outcome of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub formula_id: FormulaId,
    /// Raw numeric answer, for programmatic chaining.
    pub value: f64,
    /// Display string surfaced verbatim to end users.
    pub text: String,
    /// Inputs as the formula consumed them.
    pub parameters: BTreeMap<String, f64>,
}

impl CalculationResult {
    fn new(formula_id: FormulaId, value: f64, text: String, parameters: &[(&str, f64)]) -> Self {
        Self {
            formula_id,
            value,
            text,
            parameters: parameters
                .iter()
                .map(|(name, v)| (name.to_string(), *v))
                .collect(),
        }
    }
}

/// Run a calculation from loosely-typed parameters.
///
/// Parameter names are matched exactly; `rate` is not `r`.
pub fn calculate(formula_id: FormulaId, parameters: &Map<String, Value>) -> Result<CalculationResult> {
    let p = Parameters(parameters);
    match formula_id {
        FormulaId::FutureValue => future_value(p.required("pv")?, p.required("r")?, p.required("n")?),
        FormulaId::PresentValue => {
            present_value(p.required("fv")?, p.required("r")?, p.required("n")?)
        }
        FormulaId::RuleOf72 => rule_of_72(p.required("r")?),
        FormulaId::FvAnnuity => fv_annuity(p.required("pmt")?, p.required("r")?, p.required("n")?),
        FormulaId::PvAnnuity => pv_annuity(p.required("pmt")?, p.required("r")?, p.required("n")?),
        FormulaId::Nper => nper(
            p.required("pv")?,
            p.required("fv")?,
            p.required("r")?,
            p.optional("pmt", 0.0)?,
        ),
    }
}

/// Resolve the formula id and run the request.
pub fn run(request: &CalculationRequest) -> Result<CalculationResult> {
    let formula_id: FormulaId = request.formula_id.parse()?;
    calculate(formula_id, &request.parameters)
}

struct Parameters<'a>(&'a Map<String, Value>);

impl Parameters<'_> {
    fn required(&self, name: &str) -> Result<f64> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(PlannerError::MissingParameter(name.to_string())),
            Some(value) => number(name, value),
        }
    }

    fn optional(&self, name: &str, default: f64) -> Result<f64> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => number(name, value),
        }
    }
}

fn number(name: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        PlannerError::InvalidParameter(format!("'{}' must be a number, got {}", name, value))
    })
}

/// Reject NaN and infinities produced by undefined arithmetic.
fn finite(formula_id: FormulaId, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PlannerError::DomainError(format!(
            "{} is not a finite real number for these inputs",
            formula_id
        )))
    }
}
