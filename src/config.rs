use anyhow::Result;
use serde::Deserialize;
use std::env;

use crate::params::{EnvResolver, ParameterChain};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub research: ResearchConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model_id: String,
    pub max_tokens: u32,
    pub max_turns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub call_limit: u32,
    pub limit_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub chunk_size: usize,
    pub chunk_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        // API keys go through the parameter chain so deployments that ship
        // secrets under a different resolver keep working; everything else is
        // plain environment lookup.
        let secrets = ParameterChain::new(vec![Box::new(EnvResolver)]);

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            model: ModelConfig {
                api_key: secrets.lookup("anthropic", "api-key"),
                api_base: env::var("MODEL_API_BASE")
                    .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
                model_id: env::var("MODEL_ID")
                    .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string()),
                max_tokens: env::var("MODEL_MAX_TOKENS")
                    .unwrap_or_else(|_| "4096".to_string())
                    .parse()?,
                max_turns: env::var("AGENT_MAX_TURNS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()?,
            },
            research: ResearchConfig {
                api_key: secrets.lookup("perplexity", "api-key"),
                api_base: env::var("PERPLEXITY_API_BASE")
                    .unwrap_or_else(|_| "https://api.perplexity.ai".to_string()),
                model: env::var("PERPLEXITY_MODEL").unwrap_or_else(|_| "sonar-pro".to_string()),
                call_limit: env::var("PERPLEXITY_API_CALL_LIMIT")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                limit_enabled: env::var("PERPLEXITY_API_LIMIT_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
            relay: RelayConfig {
                chunk_size: env::var("STREAM_CHUNK_SIZE")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()?,
                chunk_delay_ms: env::var("STREAM_CHUNK_DELAY_MS")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()?,
            },
        })
    }
}
