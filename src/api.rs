//! REST API Server for the financial planner agent
//!
//! Exposes the chat agent and the formula library via HTTP endpoints
//! Integrates with the chat front-end

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agent::FinancialAgent;
use crate::config::ServerConfig;
use crate::formulas::{self, explain::ExplanationRequest, CalculationRequest};
use crate::models::ChatExchange;
use crate::Result;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub request_id: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<FinancialAgent>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatExchange>,
) -> std::result::Result<Json<ChatExchange>, (StatusCode, Json<serde_json::Value>)> {
    info!(
        history_turns = req.chat_history.len(),
        "Received chat message"
    );

    match state.agent.respond(&req.message, &req.chat_history).await {
        Ok(message) => Ok(Json(ChatExchange {
            message,
            chat_history: req.chat_history,
        })),
        Err(e) => {
            error!(error = %e, "Chat turn failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": e.to_string() })),
            ))
        }
    }
}

/// =============================
/// Formula Endpoints
/// =============================

async fn calculate_handler(Json(req): Json<CalculationRequest>) -> (StatusCode, Json<ApiResponse>) {
    match formulas::run(&req) {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::success(result))),
        Err(e) => {
            warn!(formula_id = %req.formula_id, error = %e, "Calculation rejected");
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

async fn explain_handler(Json(req): Json<ExplanationRequest>) -> Json<ApiResponse> {
    Json(ApiResponse::success(req.explain()))
}

async fn tools_handler(State(state): State<ApiState>) -> Json<ApiResponse> {
    Json(ApiResponse::success(state.agent.tools()))
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<FinancialAgent>) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat_handler))
        .route("/api/calculate", post(calculate_handler))
        .route("/api/explain", post(explain_handler))
        .route("/api/tools", get(tools_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(agent: Arc<FinancialAgent>, config: &ServerConfig) -> Result<()> {
    let router = create_router(agent);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API Server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ChatModel, ModelRequest};
    use crate::config::AgentConfig;
    use crate::error::PlannerError;
    use crate::gemini::Content;
    use crate::models::ChatTurn;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Answers with a fixed reply, or fails when none is configured.
    struct FixedModel(Option<&'static str>);

    #[async_trait]
    impl ChatModel for FixedModel {
        async fn generate(&self, _request: ModelRequest<'_>) -> Result<Content> {
            match self.0 {
                Some(text) => Ok(Content::model(text)),
                None => Err(PlannerError::LlmError(
                    "GEMINI_API_KEY not configured".to_string(),
                )),
            }
        }
    }

    fn router(reply: Option<&'static str>) -> Router {
        let agent = FinancialAgent::new(Arc::new(FixedModel(reply)), &AgentConfig::default());
        create_router(Arc::new(agent))
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(router(None), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_chat_echoes_history() {
        let history = vec![ChatTurn::user("I'm 35"), ChatTurn::assistant("Noted.")];
        let (status, body) = send(
            router(Some("At 6% your savings double in about 12 years.")),
            "POST",
            "/chat",
            Some(json!({ "message": "When will my savings double?", "chat_history": history })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "At 6% your savings double in about 12 years.");
        assert_eq!(body["chat_history"], json!(history));
    }

    #[tokio::test]
    async fn test_chat_failure_returns_detail() {
        let (status, body) = send(
            router(None),
            "POST",
            "/chat",
            Some(json!({ "message": "hello", "chat_history": [] })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_calculate() {
        let (status, body) = send(
            router(None),
            "POST",
            "/api/calculate",
            Some(json!({ "formula_id": "fv_annuity", "parameters": {"pmt": 1000, "r": 0.05, "n": 10} })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["success"].as_bool().unwrap());
        assert!(Uuid::parse_str(body["request_id"].as_str().unwrap()).is_ok());
        assert_eq!(body["data"]["formula_id"], "fv_annuity");
        assert!((body["data"]["value"].as_f64().unwrap() - 12577.89).abs() < 0.01);
        assert_eq!(
            body["data"]["text"],
            "Future Value of Annuity: $12577.89 (Payment: $1000, Rate: 5.0%, Periods: 10)"
        );
    }

    #[tokio::test]
    async fn test_calculate_rejects_bad_input() {
        let cases = [
            json!({ "formula_id": "rule_of_72", "parameters": {"r": 0} }),
            json!({ "formula_id": "future_value", "parameters": {"pv": 1000, "rate": 0.05, "n": 10} }),
            json!({ "formula_id": "black_scholes", "parameters": {} }),
        ];
        for case in cases {
            let (status, body) = send(router(None), "POST", "/api/calculate", Some(case)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(!body["success"].as_bool().unwrap());
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_explain_never_fails() {
        let (status, body) = send(
            router(None),
            "POST",
            "/api/explain",
            Some(json!({ "calculation_type": "unknown_x", "parameters": {} })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["explanation"]
            .as_str()
            .unwrap()
            .contains("unknown_x"));
    }

    #[tokio::test]
    async fn test_tools_lists_declarations() {
        let (status, body) = send(router(None), "GET", "/api/tools", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 7);
    }
}
