//! Error types for the financial planner agent

use thiserror::Error;

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Error, Debug)]
pub enum PlannerError {

    // =============================
    // Formula Library Errors
    // =============================

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown formula: {0}")]
    UnknownFormula(String),

    // =============================
    // Adapter Errors
    // =============================

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PlannerError {
    /// Missing or wrong-typed parameter.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlannerError::MissingParameter(_) | PlannerError::InvalidParameter(_)
        )
    }

    /// Failures caused by the caller's input rather than by this service.
    pub fn is_client_error(&self) -> bool {
        self.is_validation()
            || matches!(
                self,
                PlannerError::DomainError(_)
                    | PlannerError::UnknownFormula(_)
                    | PlannerError::ToolError(_)
            )
    }
}
