//! Financial tools exposed to the model
//!
//! The tool set is closed: six formulas plus `explain_calculation`.
//! Tool names coming back from the model are resolved through
//! [`FinancialTool::from_name`] and matched exhaustively, so an unknown
//! name is an explicit error rather than a silent miss.

use crate::error::PlannerError;
use crate::formulas::{self, explain_calculation, FormulaId};
use crate::gemini::FunctionDeclaration;
use crate::models::ToolOutput;
use crate::Result;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialTool {
    Formula(FormulaId),
    ExplainCalculation,
}

impl FinancialTool {
    pub const ALL: [FinancialTool; 7] = [
        FinancialTool::Formula(FormulaId::FutureValue),
        FinancialTool::Formula(FormulaId::PresentValue),
        FinancialTool::Formula(FormulaId::RuleOf72),
        FinancialTool::Formula(FormulaId::FvAnnuity),
        FinancialTool::Formula(FormulaId::PvAnnuity),
        FinancialTool::Formula(FormulaId::Nper),
        FinancialTool::ExplainCalculation,
    ];

    pub fn from_name(name: &str) -> Result<Self> {
        if name == "explain_calculation" {
            return Ok(FinancialTool::ExplainCalculation);
        }
        name.parse().map(FinancialTool::Formula)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FinancialTool::Formula(id) => id.as_str(),
            FinancialTool::ExplainCalculation => "explain_calculation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FinancialTool::Formula(FormulaId::FutureValue) => {
                "Calculate future value of an investment using FV = PV * (1 + r)^n"
            }
            FinancialTool::Formula(FormulaId::PresentValue) => {
                "Calculate present value using PV = FV / (1 + r)^n"
            }
            FinancialTool::Formula(FormulaId::RuleOf72) => {
                "Calculate years to double investment using Rule of 72"
            }
            FinancialTool::Formula(FormulaId::FvAnnuity) => {
                "Calculate future value of annuity using FV = PMT * [((1 + r)^n - 1) / r]"
            }
            FinancialTool::Formula(FormulaId::PvAnnuity) => {
                "Calculate present value of annuity using PV = PMT * [1 - (1 + r)^(-n)] / r"
            }
            FinancialTool::Formula(FormulaId::Nper) => {
                "Calculate number of periods required for investment to grow from PV to FV"
            }
            FinancialTool::ExplainCalculation => {
                "Provide detailed explanation of financial calculation"
            }
        }
    }

    /// JSON-Schema object describing the tool's arguments.
    pub fn parameters_schema(&self) -> Value {
        let rate = number("Interest rate per period as decimal (e.g., 0.05 for 5%)");
        let periods = number("Number of periods");
        let payment = number("Payment amount per period");

        match self {
            FinancialTool::Formula(FormulaId::FutureValue) => object(
                json!({
                    "pv": number("Present value (initial investment)"),
                    "r": rate,
                    "n": periods,
                }),
                &["pv", "r", "n"],
            ),
            FinancialTool::Formula(FormulaId::PresentValue) => object(
                json!({
                    "fv": number("Future value"),
                    "r": rate,
                    "n": periods,
                }),
                &["fv", "r", "n"],
            ),
            FinancialTool::Formula(FormulaId::RuleOf72) => {
                object(json!({ "r": rate }), &["r"])
            }
            FinancialTool::Formula(FormulaId::FvAnnuity)
            | FinancialTool::Formula(FormulaId::PvAnnuity) => object(
                json!({
                    "pmt": payment,
                    "r": rate,
                    "n": periods,
                }),
                &["pmt", "r", "n"],
            ),
            FinancialTool::Formula(FormulaId::Nper) => object(
                json!({
                    "pv": number("Present value"),
                    "fv": number("Future value"),
                    "r": rate,
                    "pmt": number("Payment per period (defaults to 0)"),
                }),
                &["pv", "fv", "r"],
            ),
            FinancialTool::ExplainCalculation => object(
                json!({
                    "calculation_type": {
                        "type": "string",
                        "description": "Type of calculation to explain",
                    },
                    "parameters": {
                        "type": "object",
                        "description": "Parameters used in the calculation",
                    },
                }),
                &["calculation_type"],
            ),
        }
    }

    pub fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }

    /// Declarations for every tool, in a stable order.
    pub fn declarations() -> Vec<FunctionDeclaration> {
        FinancialTool::ALL.iter().map(|t| t.declaration()).collect()
    }

    /// Run the tool against model-supplied arguments.
    pub fn invoke(&self, args: &Value) -> Result<ToolOutput> {
        let args = ensure_object_parameters(self.name(), args)?;

        match self {
            FinancialTool::Formula(id) => {
                let result = formulas::calculate(*id, args)?;
                Ok(ToolOutput {
                    success: true,
                    data: json!({
                        "result": result.text,
                        "value": result.value,
                    }),
                    error: None,
                })
            }
            FinancialTool::ExplainCalculation => {
                let calculation_type = args
                    .get("calculation_type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        PlannerError::MissingParameter("calculation_type".to_string())
                    })?;
                let parameters = args.get("parameters").cloned().unwrap_or_else(|| json!({}));

                Ok(ToolOutput {
                    success: true,
                    data: json!({
                        "result": explain_calculation(calculation_type, &parameters),
                    }),
                    error: None,
                })
            }
        }
    }
}

fn ensure_object_parameters<'a>(tool: &str, args: &'a Value) -> Result<&'a Map<String, Value>> {
    args.as_object().ok_or_else(|| {
        PlannerError::ToolError(format!("{} arguments must be a JSON object", tool))
    })
}

fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
