// Anthropic Messages API adapter
// API Reference: https://docs.anthropic.com/en/api/messages
//
// Tool use rides in the content blocks: a reply that wants tools stops with
// stop_reason "tool_use" and carries one tool_use block per request; tool
// results go back as tool_result blocks in a user message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::llm::provider::ModelAdapter;
use crate::types::{AppError, AppResult, ChatMessage, ContentBlock, ModelReply, StopReason, ToolSpec};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
}

// Request types for the Messages API
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool<'a>>,
}

#[derive(Serialize)]
struct AnthropicTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

// Response types for the Messages API. ContentBlock's wire encoding already
// matches the API's content blocks, so it deserializes directly.
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<StopReason>,
}

#[derive(Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

impl AnthropicAdapter {
    pub fn new(api_key: &str, api_base: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }
}

#[async_trait]
impl ModelAdapter for AnthropicAdapter {
    async fn converse(
        &self,
        system: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> AppResult<ModelReply> {
        let url = format!("{}/v1/messages", self.api_base);

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages,
            tools: tools
                .iter()
                .map(|spec| AnthropicTool {
                    name: &spec.name,
                    description: &spec.description,
                    input_schema: &spec.input_schema,
                })
                .collect(),
        };

        debug!(model = %self.model, message_count = messages.len(), "sending messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ModelApi(format!("Messages request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<AnthropicErrorResponse>(&error_text)
            {
                return Err(AppError::ModelApi(format!(
                    "Anthropic API error ({}): {} (type: {:?})",
                    status, error_response.error.message, error_response.error.error_type
                )));
            }

            return Err(AppError::ModelApi(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::ModelApi(format!("Failed to parse messages response: {}", e)))?;

        Ok(ModelReply {
            content: body.content,
            stop_reason: body.stop_reason.unwrap_or(StopReason::EndTurn),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter_for(server: &mockito::ServerGuard) -> AnthropicAdapter {
        AnthropicAdapter::new("test-key", &server.url(), "claude-test", 512)
    }

    #[tokio::test]
    async fn test_converse_parses_text_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "content": [{ "type": "text", "text": "The Going Merry." }],
                    "stop_reason": "end_turn"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let reply = adapter_for(&server)
            .converse("You are helpful.", &[ChatMessage::user("First ship?")], &[])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply.text(), "The Going Merry.");
        assert_eq!(reply.stop_reason, StopReason::EndTurn);
        assert!(reply.tool_uses().is_empty());
    }

    #[tokio::test]
    async fn test_converse_parses_tool_use_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "content": [
                        { "type": "text", "text": "Checking the catalog." },
                        {
                            "type": "tool_use",
                            "id": "toolu_abc",
                            "name": "storefront_search",
                            "input": { "query": "zoro" }
                        }
                    ],
                    "stop_reason": "tool_use"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let reply = adapter_for(&server)
            .converse("You are helpful.", &[ChatMessage::user("Find Zoro cards")], &[])
            .await
            .unwrap();

        assert_eq!(reply.stop_reason, StopReason::ToolUse);
        let uses = reply.tool_uses();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].0, "toolu_abc");
        assert_eq!(uses[0].1, "storefront_search");
        assert_eq!(uses[0].2, &json!({ "query": "zoro" }));
    }

    #[tokio::test]
    async fn test_converse_surfaces_typed_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "type": "error",
                    "error": { "type": "authentication_error", "message": "invalid x-api-key" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = adapter_for(&server)
            .converse("system", &[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();

        match err {
            AppError::ModelApi(message) => {
                assert!(message.contains("invalid x-api-key"));
                assert!(message.contains("401"));
            }
            other => panic!("expected ModelApi error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_converse_tools_serialized_into_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_body(mockito::Matcher::PartialJson(json!({
                "tools": [{
                    "name": "competitive_decks",
                    "description": "Look up winning decks"
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "content": [{ "type": "text", "text": "ok" }],
                    "stop_reason": "end_turn"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let tools = vec![ToolSpec {
            name: "competitive_decks".to_string(),
            description: "Look up winning decks".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }];

        adapter_for(&server)
            .converse("system", &[ChatMessage::user("decks?")], &tools)
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
