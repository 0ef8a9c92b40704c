//! Financial Planner Agent
//!
//! A chat agent that answers retirement and savings questions by letting
//! Gemini call a small library of closed-form financial formulas:
//! - Future / present value of a lump sum
//! - Future / present value of an ordinary annuity
//! - Rule of 72 doubling time
//! - Number of periods to reach a target
//!
//! The formulas are pure functions; the model only picks which one to call.
//!
//! LOOP:
//! MESSAGE → MODEL → TOOL CALLS → FORMULAS → MODEL → REPLY

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod formulas;
pub mod gemini;
pub mod models;
pub mod prompts;
pub mod tools;

pub use error::Result;

// Re-export common types
pub use agent::{ChatModel, FinancialAgent};
pub use config::AppConfig;
pub use error::PlannerError;
pub use formulas::{CalculationRequest, CalculationResult, FormulaId};
pub use models::*;
pub use tools::FinancialTool;
