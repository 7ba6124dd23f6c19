//! Weather agent: forecast lookups against the National Weather Service API.
//!
//! The streaming variant adds a `ready_to_summarize` gate tool. The prompt
//! tells the model to call it once its lookups are done; the handler holds
//! back everything before the gate fires so the client only sees the summary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::agents::Agent;
use crate::models::AppState;
use crate::tools::{HttpRequestTool, Tool};
use crate::types::AppResult;

const WEATHER_SYSTEM_PROMPT: &str = r#"You are a weather assistant with HTTP capabilities. You can:

1. Make HTTP requests to the National Weather Service API
2. Process and display weather forecast data
3. Provide weather information for locations in the United States

When retrieving weather information:
1. First get the coordinates or grid information using https://api.weather.gov/points/{latitude},{longitude} or https://api.weather.gov/points/{zipcode}
2. Then use the returned forecast URL to get the actual forecast

When displaying responses:
- Format weather data in a human-readable way
- Highlight important information like temperature, precipitation, and alerts
- Handle errors appropriately
- Don't ask follow-up questions

Always explain the weather conditions clearly and provide context for the forecast."#;

const SUMMARY_GATE_INSTRUCTION: &str = "At the point where tools are done being invoked and a \
summary can be presented to the user, invoke the ready_to_summarize tool and then continue \
with the summary.";

/// Request-scoped flag the streaming handler reads to decide when the
/// model has moved from lookups to its final summary.
#[derive(Clone, Default)]
pub struct SummaryGate(Arc<AtomicBool>);

impl SummaryGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn arm(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Tool the model calls right before writing its summary.
struct ReadyToSummarizeTool {
    gate: SummaryGate,
}

#[async_trait]
impl Tool for ReadyToSummarizeTool {
    fn name(&self) -> &str {
        "ready_to_summarize"
    }

    fn description(&self) -> &str {
        "Signal that all lookups are finished and the final weather summary comes next. \
         Call this exactly once, immediately before writing the summary."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> AppResult<Value> {
        debug!("summary gate armed");
        self.gate.arm();
        Ok(json!({
            "success": true,
            "message": "Ok - continue providing the summary!"
        }))
    }
}

/// Weather agent for the single-shot endpoint.
pub fn agent(state: &AppState) -> AppResult<Agent> {
    Ok(Agent::new(
        "weather",
        WEATHER_SYSTEM_PROMPT,
        vec![Arc::new(HttpRequestTool::new(state.http.clone()))],
        state.model_adapter()?,
        state.config.model.max_turns,
    ))
}

/// Weather agent for the streaming endpoint, paired with the gate the
/// handler polls while filtering the event stream.
pub fn streaming_agent(state: &AppState) -> AppResult<(Agent, SummaryGate)> {
    let gate = SummaryGate::new();
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(HttpRequestTool::new(state.http.clone())),
        Arc::new(ReadyToSummarizeTool { gate: gate.clone() }),
    ];

    let agent = Agent::new(
        "weather",
        format!("{WEATHER_SYSTEM_PROMPT}\n\n{SUMMARY_GATE_INSTRUCTION}"),
        tools,
        state.model_adapter()?,
        state.config.model.max_turns,
    );
    Ok((agent, gate))
}
