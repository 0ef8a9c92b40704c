//! Gemini API client with function calling
//!
//! Speaks the `generateContent` REST endpoint: system instruction,
//! conversation contents and function declarations go out, candidate
//! content (text and/or function calls) comes back.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::agent::{ChatModel, ModelRequest};
use crate::config::GeminiConfig;
use crate::error::PlannerError;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

//
// ================= Wire types =================
//

/// One turn of a Gemini conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Self::default()
        }
    }
}

impl Content {
    pub const USER: &'static str = "user";
    pub const MODEL: &'static str = "model";

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(Self::USER.to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some(Self::MODEL.to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Tool results are sent back on the user side of the conversation.
    pub fn function_responses(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Self::USER.to_string()),
            parts,
        }
    }

    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| p.function_call.as_ref())
            .collect()
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: &'a [Content],
    generation_config: GenerationConfig,
    system_instruction: Content,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tools<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tools<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
}

//
// ================= Client =================
//

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

enum SendError {
    Retryable(PlannerError),
    Fatal(PlannerError),
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    async fn send_once(&self, url: &str, body: &GeminiRequest<'_>) -> std::result::Result<GeminiResponse, SendError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                SendError::Retryable(PlannerError::LlmError(format!("Gemini API error: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = PlannerError::LlmError(format!(
                "Gemini API returned {}: {}",
                status, error_text
            ));
            return if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                Err(SendError::Retryable(err))
            } else {
                Err(SendError::Fatal(err))
            };
        }

        response.json::<GeminiResponse>().await.map_err(|e| {
            SendError::Fatal(PlannerError::LlmError(format!("Gemini parse error: {}", e)))
        })
    }

    /// Generate the next model turn for a conversation.
    pub async fn generate_content(
        &self,
        system_instruction: &str,
        contents: &[Content],
        tools: &[FunctionDeclaration],
    ) -> Result<Content> {
        if self.config.api_key.is_empty() {
            return Err(PlannerError::LlmError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = self.endpoint();
        let body = GeminiRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(system_instruction)],
            },
            tools: if tools.is_empty() {
                Vec::new()
            } else {
                vec![Tools {
                    function_declarations: tools,
                }]
            },
        };

        info!(model = %self.config.model, turns = contents.len(), "Calling Gemini API");

        let mut attempt = 0;
        let response = loop {
            match self.send_once(&url, &body).await {
                Ok(response) => break response,
                Err(SendError::Retryable(e)) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Gemini request failed, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(SendError::Retryable(e)) | Err(SendError::Fatal(e)) => {
                    error!(error = %e, "Gemini request failed");
                    return Err(e);
                }
            }
        };

        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            PlannerError::LlmError("No response from Gemini API".to_string())
        })?;

        info!(
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN"),
            "Gemini response received"
        );

        let mut content = candidate.content;
        if content.role.is_none() {
            content.role = Some(Content::MODEL.to_string());
        }
        Ok(content)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<Content> {
        self.generate_content(request.system_instruction, request.contents, request.tools)
            .await
    }
}
