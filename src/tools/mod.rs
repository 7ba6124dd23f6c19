//! Agent Tools
//!
//! Callable capabilities advertised to the model by the agents:
//!
//! - `competitive_decks` - tournament deck lookup (mocked catalog)
//! - `card_research` - card identification via the Perplexity API
//! - `storefront_search` / `storefront_cart` - store catalog and cart (mocked)
//! - `research_quota` - inspect/reset the research call counter
//! - `http_request` - plain GET fetch for the weather agent
//!
//! Tools never propagate upstream failures as errors: a failed API call or an
//! exhausted quota comes back as a descriptive payload the model can read.
//! Only malformed input from the model surfaces as `Err`, which the agent
//! loop folds into the tool result.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{AppResult, ToolSpec};

pub mod decks;
pub mod http;
pub mod research;
pub mod storefront;

pub use decks::CompetitiveDecksTool;
pub use http::HttpRequestTool;
pub use research::{
    CardResearchTool, ResearchClient, ResearchQuota, ResearchQuotaTool,
};
pub use storefront::{StorefrontCartTool, StorefrontSearchTool};

/// A callable capability advertised to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model calls the tool by
    fn name(&self) -> &str;

    /// Description included in the model prompt
    fn description(&self) -> &str;

    /// JSON schema of the tool's input object
    fn input_schema(&self) -> Value;

    /// Run the tool against model-supplied input
    async fn execute(&self, input: Value) -> AppResult<Value>;

    /// Spec advertised to the model adapter
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
