use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ModelConfig;
use crate::llm::anthropic::AnthropicAdapter;
use crate::types::{AppResult, ChatMessage, ModelReply, ToolSpec};

/// A chat-completions model that can request tool invocations.
///
/// One call is one model turn: the adapter sends the system prompt, the
/// conversation so far, and the advertised tools, and returns the model's
/// content blocks plus the stop reason. The agent loop decides what to do
/// with tool-use requests.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    async fn converse(
        &self,
        system: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> AppResult<ModelReply>;
}

/// Build the configured model adapter.
///
/// Returns `None` when no API key is configured; the server still starts and
/// the model-backed endpoints report the missing key per request.
pub fn adapter_from_config(config: &ModelConfig) -> Option<Arc<dyn ModelAdapter>> {
    let api_key = config.api_key.as_deref()?;
    Some(Arc::new(AnthropicAdapter::new(
        api_key,
        &config.api_base,
        &config.model_id,
        config.max_tokens,
    )))
}
