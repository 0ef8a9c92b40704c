//! Financial agent - the tool-invocation loop
//!
//! USER MESSAGE → MODEL → TOOL CALLS? → TOOL RESULTS → MODEL → ... → REPLY
//!
//! The model chooses tools and arguments; the formulas do the arithmetic.
//! Tool failures are handed back to the model as `{"error": ...}` so it can
//! correct its arguments or ask the user.

use crate::config::AgentConfig;
use crate::error::PlannerError;
use crate::gemini::{Content, FunctionCall, FunctionDeclaration, Part};
use crate::models::{ChatTurn, ToolOutput};
use crate::prompts::FINANCIAL_PLANNER;
use crate::tools::FinancialTool;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod history;
pub use history::format_chat_history;

/// One generation request: system prompt, conversation so far, available tools.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub system_instruction: &'a str,
    pub contents: &'a [Content],
    pub tools: &'a [FunctionDeclaration],
}

/// Trait for the language model behind the agent
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce the next model turn.
    async fn generate(&self, request: ModelRequest<'_>) -> Result<Content>;
}

pub struct FinancialAgent {
    model: Arc<dyn ChatModel>,
    tools: Vec<FunctionDeclaration>,
    max_tool_rounds: usize,
}

impl FinancialAgent {
    pub fn new(model: Arc<dyn ChatModel>, config: &AgentConfig) -> Self {
        Self {
            model,
            tools: FinancialTool::declarations(),
            max_tool_rounds: config.max_tool_rounds,
        }
    }

    pub fn tools(&self) -> &[FunctionDeclaration] {
        &self.tools
    }

    /// Answer `message` in the context of `history`.
    pub async fn respond(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let mut contents = format_chat_history(history);
        contents.push(Content::user(message));

        info!(history_turns = contents.len() - 1, "Agent turn started");

        for round in 0..=self.max_tool_rounds {
            let reply = self
                .model
                .generate(ModelRequest {
                    system_instruction: FINANCIAL_PLANNER,
                    contents: &contents,
                    tools: &self.tools,
                })
                .await?;

            let calls: Vec<FunctionCall> = reply.function_calls().into_iter().cloned().collect();
            if calls.is_empty() {
                let text = reply.text();
                if text.trim().is_empty() {
                    return Err(PlannerError::LlmError(
                        "Empty response from Gemini".to_string(),
                    ));
                }
                info!(rounds = round, "Agent turn completed");
                return Ok(text);
            }

            if round == self.max_tool_rounds {
                break;
            }

            let responses = calls.iter().map(run_tool).collect();
            contents.push(reply);
            contents.push(Content::function_responses(responses));
        }

        warn!(max_tool_rounds = self.max_tool_rounds, "Tool round limit reached");
        Err(PlannerError::LlmError(format!(
            "Model kept calling tools after {} rounds",
            self.max_tool_rounds
        )))
    }
}

/// Execute one function call and wrap the outcome as a function response part.
fn run_tool(call: &FunctionCall) -> Part {
    let output = FinancialTool::from_name(&call.name)
        .and_then(|tool| tool.invoke(&call.args))
        .unwrap_or_else(|e| {
            warn!(tool = %call.name, error = %e, "Tool call failed");
            ToolOutput::failure(e.to_string())
        });

    debug!(tool = %call.name, success = output.success, "Tool call finished");

    let response = if output.success {
        output.data
    } else {
        serde_json::json!({ "error": output.error.unwrap_or_default() })
    };
    Part::function_response(call.name.clone(), response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned model turns and records every request's contents.
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<Content>>>,
        seen: Mutex<Vec<Vec<Content>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<Content>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn generate(&self, request: ModelRequest<'_>) -> Result<Content> {
            assert_eq!(request.system_instruction, FINANCIAL_PLANNER);
            assert_eq!(request.tools.len(), 7);
            self.seen.lock().unwrap().push(request.contents.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Content::model("out of script")))
        }
    }

    fn call(name: &str, args: Value) -> Content {
        Content {
            role: Some("model".to_string()),
            parts: vec![Part {
                function_call: Some(FunctionCall {
                    name: name.to_string(),
                    args,
                }),
                ..Part::default()
            }],
        }
    }

    fn function_response_field<'a>(content: &'a Content, name: &str, field: &str) -> Option<&'a Value> {
        content
            .parts
            .iter()
            .filter_map(|p| p.function_response.as_ref())
            .find(|r| r.name == name)
            .and_then(|r| r.response.get(field))
    }

    fn agent(model: Arc<ScriptedModel>, max_tool_rounds: usize) -> FinancialAgent {
        FinancialAgent::new(model, &AgentConfig { max_tool_rounds })
    }

    #[tokio::test]
    async fn test_plain_answer_with_history() {
        let model = ScriptedModel::new(vec![Ok(Content::model("How old are you?"))]);
        let agent = agent(model.clone(), 5);

        let history = vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello!")];
        let answer = agent.respond("Help me plan retirement", &history).await.unwrap();

        assert_eq!(answer, "How old are you?");
        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 3);
        assert_eq!(seen[0][2], Content::user("Help me plan retirement"));
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let model = ScriptedModel::new(vec![
            Ok(call("future_value", json!({"pv": 1000, "r": 0.05, "n": 10}))),
            Ok(Content::model("Your investment grows to $1628.89.")),
        ]);
        let agent = agent(model.clone(), 5);

        let answer = agent
            .respond("What is $1000 worth after 10 years at 5%?", &[])
            .await
            .unwrap();
        assert_eq!(answer, "Your investment grows to $1628.89.");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let tool_turn = seen[1].last().unwrap();
        assert_eq!(tool_turn.role.as_deref(), Some("user"));
        let result = function_response_field(tool_turn, "future_value", "result").unwrap();
        assert_eq!(
            result,
            "Future Value: $1628.89 (Principal: $1000, Rate: 5.0%, Periods: 10)"
        );
    }

    #[tokio::test]
    async fn test_tool_errors_are_returned_to_model() {
        let model = ScriptedModel::new(vec![
            Ok(call("rule_of_72", json!({"rate": 0.06}))),
            Ok(call("rule_of_72", json!({"r": 0.0}))),
            Ok(call("internal_rate_of_return", json!({}))),
            Ok(Content::model("Please share a non-zero interest rate.")),
        ]);
        let agent = agent(model.clone(), 5);

        let answer = agent.respond("When will my money double?", &[]).await.unwrap();
        assert_eq!(answer, "Please share a non-zero interest rate.");

        let seen = model.seen.lock().unwrap();
        let missing = function_response_field(seen[1].last().unwrap(), "rule_of_72", "error").unwrap();
        assert!(missing.as_str().unwrap().contains("Missing parameter: r"));

        let domain = function_response_field(seen[2].last().unwrap(), "rule_of_72", "error").unwrap();
        assert!(domain.as_str().unwrap().starts_with("Domain error"));

        let unknown = function_response_field(
            seen[3].last().unwrap(),
            "internal_rate_of_return",
            "error",
        )
        .unwrap();
        assert!(unknown.as_str().unwrap().contains("Unknown formula"));
    }

    #[tokio::test]
    async fn test_tool_round_limit() {
        let model = ScriptedModel::new(vec![
            Ok(call("rule_of_72", json!({"r": 0.06}))),
            Ok(call("rule_of_72", json!({"r": 0.06}))),
            Ok(call("rule_of_72", json!({"r": 0.06}))),
        ]);
        let agent = agent(model.clone(), 2);

        let err = agent.respond("double?", &[]).await.unwrap_err();
        assert!(matches!(err, PlannerError::LlmError(_)));
        assert_eq!(model.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let model = ScriptedModel::new(vec![Ok(Content::model("   "))]);
        let err = agent(model, 5).respond("hello", &[]).await.unwrap_err();
        assert!(matches!(err, PlannerError::LlmError(msg) if msg.contains("Empty")));
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        let model = ScriptedModel::new(vec![Err(PlannerError::LlmError(
            "GEMINI_API_KEY not configured".to_string(),
        ))]);
        let err = agent(model, 5).respond("hello", &[]).await.unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
