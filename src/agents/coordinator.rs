//! Coordinator agent: the shopping assistant behind the `/assistant` endpoints.
//!
//! Routes a natural-language request across the deck database, the card
//! research API, and the storefront tools.

use std::sync::Arc;

use crate::agents::Agent;
use crate::models::AppState;
use crate::tools::{
    CardResearchTool, CompetitiveDecksTool, ResearchQuotaTool, StorefrontCartTool,
    StorefrontSearchTool, Tool,
};
use crate::types::AppResult;

const COORDINATOR_SYSTEM_PROMPT: &str = r#"You are a One Piece Trading Card Game shopping assistant that helps players find competitive decks and purchase cards.

Your task is to coordinate between these specialized tools:
1. competitive_decks: Finds competitive tournament decks from the gumgum.gg database
2. card_research: Provides detailed information about specific cards
3. storefront_search: Searches the store catalog for cards
4. storefront_cart: Manages the shopping cart
5. research_quota: For testing purposes, manages the research API call counter

When a user asks about competitive decks:
1. Use competitive_decks to find appropriate decks
2. Use card_research to get detailed information about key cards
3. Use storefront_search to check availability and pricing
4. Use storefront_cart to help them add cards to their cart

When a user asks about specific cards:
1. Use card_research to get detailed information
2. Use storefront_search to check availability and pricing

When a user wants to purchase cards:
1. Use storefront_cart to manage their shopping cart
2. Guide them through the checkout process

IMPORTANT: Explain your reasoning process clearly as you work through each step.
For example, when analyzing a deck request, explain how you're interpreting the user's preferences.
When researching cards, explain why you're focusing on certain cards first.
When checking shopping options, explain your strategy for finding the best deals.

Always provide helpful, accurate information about One Piece TCG cards and decks.

For testing purposes, you can use the research_quota tool to:
- Check the current API call count with action="get"
- Reset the counter with action="reset""#;

/// Build the coordinator agent against the process state.
pub fn agent(state: &AppState) -> AppResult<Agent> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(CompetitiveDecksTool),
        Arc::new(CardResearchTool::new(state.research.clone())),
        Arc::new(StorefrontSearchTool),
        Arc::new(StorefrontCartTool),
        Arc::new(ResearchQuotaTool::new(state.quota.clone())),
    ];

    Ok(Agent::new(
        "coordinator",
        COORDINATOR_SYSTEM_PROMPT,
        tools,
        state.model_adapter()?,
        state.config.model.max_turns,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ModelConfig, RelayConfig, ResearchConfig, ServerConfig};
    use crate::llm::ModelAdapter;
    use crate::tools::{ResearchClient, ResearchQuota};
    use crate::types::{AppError, ChatMessage, ModelReply, ToolSpec};
    use async_trait::async_trait;

    struct NullAdapter;

    #[async_trait]
    impl ModelAdapter for NullAdapter {
        async fn converse(
            &self,
            _system: &str,
            _messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> crate::types::AppResult<ModelReply> {
            Err(AppError::Agent("not wired in this test".to_string()))
        }
    }

    fn state(adapter: Option<Arc<dyn ModelAdapter>>) -> AppState {
        let config = Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            model: ModelConfig {
                api_key: Some("test-key".to_string()),
                api_base: "http://127.0.0.1:1".to_string(),
                model_id: "claude-test".to_string(),
                max_tokens: 512,
                max_turns: 4,
            },
            research: ResearchConfig {
                api_key: None,
                api_base: "http://127.0.0.1:1".to_string(),
                model: "sonar-pro".to_string(),
                call_limit: 10,
                limit_enabled: true,
            },
            relay: RelayConfig {
                chunk_size: 50,
                chunk_delay_ms: 0,
            },
        };
        let http = reqwest::Client::new();
        let quota = Arc::new(ResearchQuota::from_config(&config.research));
        let research = Arc::new(ResearchClient::new(
            &config.research,
            http.clone(),
            quota.clone(),
        ));
        AppState {
            config,
            http,
            model: adapter,
            quota,
            research,
        }
    }

    #[test]
    fn test_agent_carries_the_full_toolset() {
        let agent = agent(&state(Some(Arc::new(NullAdapter)))).unwrap();
        assert_eq!(
            agent.tool_names(),
            vec![
                "competitive_decks",
                "card_research",
                "storefront_search",
                "storefront_cart",
                "research_quota",
            ]
        );
    }

    #[test]
    fn test_missing_model_key_is_a_config_error() {
        let err = agent(&state(None))
            .err()
            .expect("agent construction should fail without a model key");
        assert!(matches!(err, AppError::Config(_)));
    }
}
