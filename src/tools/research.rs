// Card research via the Perplexity chat-completions API

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::ResearchConfig;
use crate::tools::Tool;
use crate::types::{AppError, AppResult};

/// Injected call budget for the research API.
///
/// One instance lives in process state and is shared by the research client
/// and the quota tool; nothing reads it as a global. The count survives for
/// the life of the process unless reset.
pub struct ResearchQuota {
    limit: u32,
    enabled: bool,
    used: AtomicU32,
}

impl ResearchQuota {
    pub fn new(limit: u32, enabled: bool) -> Self {
        Self {
            limit,
            enabled,
            used: AtomicU32::new(0),
        }
    }

    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new(config.call_limit, config.limit_enabled)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// True once the enabled budget is fully spent.
    pub fn exhausted(&self) -> bool {
        self.enabled && self.used.load(Ordering::SeqCst) >= self.limit
    }

    /// Count one completed call against the budget.
    pub fn consume(&self) {
        self.used.fetch_add(1, Ordering::SeqCst);
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used())
    }

    pub fn reset(&self) {
        self.used.store(0, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Value {
        json!({
            "count": self.used(),
            "limit": self.limit,
            "enabled": self.enabled,
            "remaining": self.remaining()
        })
    }
}

/// Fixed identification prompt the card-search endpoints wrap a user's card
/// description in before handing it to the research API.
pub fn card_identification_prompt(card_query: &str) -> String {
    format!(
        "Please identify this One Piece Trading Card Game card: {}. Include the card ID, \
         name, type, color, cost, power, counter, effect text, set information, and rarity.",
        card_query
    )
}

pub struct ResearchClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
    quota: Arc<ResearchQuota>,
}

// Request/response types for the chat-completions call
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: String,
}

impl ResearchClient {
    pub fn new(config: &ResearchConfig, client: Client, quota: Arc<ResearchQuota>) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            quota,
        }
    }

    /// Ask the research model one question and return its answer with
    /// citations appended. Only successful calls count against the quota;
    /// a failed call leaves the budget untouched.
    pub async fn research(&self, query: &str) -> AppResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Config("PERPLEXITY_API_KEY is not configured".to_string())
        })?;

        if self.quota.exhausted() {
            return Err(AppError::QuotaExhausted(format!(
                "research call limit of {} reached",
                self.quota.limit()
            )));
        }

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![WireMessage {
                role: "user",
                content: query,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ModelApi(format!("Research request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ModelApi(format!(
                "Research API error ({}): {}",
                status, error_text
            )));
        }

        self.quota.consume();
        info!(used = self.quota.used(), limit = self.quota.limit(), "research call");

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::ModelApi(format!("Failed to parse research response: {}", e)))?;

        let mut content = body
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::ModelApi("Research API returned no choices".to_string()))?;

        if !body.citations.is_empty() {
            content.push_str("\n\nCitations:\n");
            for (i, citation) in body.citations.iter().enumerate() {
                content.push_str(&format!("[{}] {}\n", i + 1, citation));
            }
        }

        Ok(content)
    }
}

/// Agent-facing wrapper around [`ResearchClient`].
pub struct CardResearchTool {
    client: Arc<ResearchClient>,
}

#[derive(Deserialize)]
struct ResearchInput {
    query: String,
}

impl CardResearchTool {
    pub fn new(client: Arc<ResearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CardResearchTool {
    fn name(&self) -> &str {
        "card_research"
    }

    fn description(&self) -> &str {
        "Research detailed information about a specific One Piece TCG card: card ID, name, \
         type, color, cost, power, counter, effect text, set, and rarity. Backed by a \
         rate-limited web research API, so batch related questions into one query."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Card name, ID, or question to research" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> AppResult<Value> {
        let input: ResearchInput = serde_json::from_value(input)?;

        match self.client.research(&input.query).await {
            Ok(content) => Ok(json!({
                "success": true,
                "content": content,
                "source": "perplexity"
            })),
            Err(e) => {
                warn!(error = %e, "research call failed");
                Ok(json!({
                    "success": false,
                    "error": format!("Research unavailable: {}", e)
                }))
            }
        }
    }
}

/// Inspect or reset the research call counter.
pub struct ResearchQuotaTool {
    quota: Arc<ResearchQuota>,
}

#[derive(Deserialize)]
struct QuotaInput {
    #[serde(default = "default_quota_action")]
    action: String,
}

fn default_quota_action() -> String {
    "get".to_string()
}

impl ResearchQuotaTool {
    pub fn new(quota: Arc<ResearchQuota>) -> Self {
        Self { quota }
    }
}

#[async_trait]
impl Tool for ResearchQuotaTool {
    fn name(&self) -> &str {
        "research_quota"
    }

    fn description(&self) -> &str {
        "Manage the research API call counter. Use action \"get\" to read the current \
         count and limit, or \"reset\" to zero the counter."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "enum": ["get", "reset"], "default": "get" }
            }
        })
    }

    async fn execute(&self, input: Value) -> AppResult<Value> {
        let input: QuotaInput = serde_json::from_value(input)?;

        if input.action == "reset" {
            self.quota.reset();
            info!("research quota reset");
            return Ok(json!({
                "success": true,
                "message": "Research API counter reset successfully",
                "counter": self.quota.snapshot()
            }));
        }

        Ok(json!({
            "success": true,
            "counter": self.quota.snapshot()
        }))
    }
}
