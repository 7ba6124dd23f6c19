use std::sync::Arc;

use reqwest::Client;
use tracing::warn;

use crate::config::Config;
use crate::llm::{adapter_from_config, ModelAdapter};
use crate::tools::{ResearchClient, ResearchQuota};
use crate::types::{AppError, AppResult};

/// Process-wide state shared by every handler.
///
/// The model adapter is optional: without an API key the server still comes
/// up and the agent-backed endpoints report the missing key per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http: Client,
    pub model: Option<Arc<dyn ModelAdapter>>,
    pub quota: Arc<ResearchQuota>,
    pub research: Arc<ResearchClient>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let http = Client::new();
        let quota = Arc::new(ResearchQuota::from_config(&config.research));
        let research = Arc::new(ResearchClient::new(
            &config.research,
            http.clone(),
            quota.clone(),
        ));
        let model = adapter_from_config(&config.model);
        if model.is_none() {
            warn!("ANTHROPIC_API_KEY is not set; agent endpoints will report a configuration error");
        }

        Self {
            config,
            http,
            model,
            quota,
            research,
        }
    }

    /// The configured model adapter, or the error agent endpoints return
    /// when no key was configured.
    pub fn model_adapter(&self) -> AppResult<Arc<dyn ModelAdapter>> {
        self.model
            .clone()
            .ok_or_else(|| AppError::Config("ANTHROPIC_API_KEY is not configured".to_string()))
    }
}

/// Request body shared by all prompt-driven endpoints.
#[derive(Debug, serde::Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

impl PromptRequest {
    /// Reject blank prompts before any agent or upstream work happens.
    pub fn validated(&self) -> AppResult<&str> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::InvalidRequest("No prompt provided".to_string()));
        }
        Ok(prompt)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_prompts_are_rejected() {
        for prompt in ["", "   ", "\n\t"] {
            let request = PromptRequest {
                prompt: prompt.to_string(),
            };
            assert!(matches!(
                request.validated(),
                Err(AppError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn test_prompt_is_trimmed() {
        let request = PromptRequest {
            prompt: "  weather in Seattle  ".to_string(),
        };
        assert_eq!(request.validated().unwrap(), "weather in Seattle");
    }
}
