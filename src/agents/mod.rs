//! Agent System
//!
//! An agent is a system prompt, a toolset, and a model adapter driven through
//! a converse loop:
//!
//! ```text
//! User Prompt
//!      │
//!      ▼
//! ┌─────────────┐   tool_use requests   ┌─────────────┐
//! │   Model     │ ────────────────────▶ │   Tools     │
//! │   Adapter   │ ◀──────────────────── │             │
//! └─────────────┘     tool results      └─────────────┘
//!      │
//!      ▼ (no more tool requests, or turn cap)
//!  Final Answer
//! ```
//!
//! The loop is exposed in three forms:
//!
//! - [`Agent::invoke`] - run to completion, return the final answer text
//! - [`Agent::into_event_stream`] - native event stream: a `data` event per
//!   assistant text turn, a `tool_use` event per tool invocation
//! - [`Agent::run_with_sink`] - push the same events into an [`EventSink`]
//!   owned by a relay session
//!
//! The stream forms never emit their own terminal event; the relay layer owns
//! that guarantee.

pub mod coordinator;
pub mod weather;

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::llm::ModelAdapter;
use crate::relay::{AgentEvent, EventSink};
use crate::tools::Tool;
use crate::types::{
    AppError, AppResult, ChatMessage, ContentBlock, ModelReply, StopReason, ToolSpec,
};

/// A tool-calling agent bound to one model adapter.
pub struct Agent {
    name: &'static str,
    system_prompt: String,
    tools: Vec<Arc<dyn Tool>>,
    adapter: Arc<dyn ModelAdapter>,
    max_turns: u32,
}

impl Agent {
    pub fn new(
        name: &'static str,
        system_prompt: impl Into<String>,
        tools: Vec<Arc<dyn Tool>>,
        adapter: Arc<dyn ModelAdapter>,
        max_turns: u32,
    ) -> Self {
        Self {
            name,
            system_prompt: system_prompt.into(),
            tools,
            adapter,
            max_turns,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    fn owned_tool_uses(reply: &ModelReply) -> Vec<(String, String, Value)> {
        reply
            .tool_uses()
            .into_iter()
            .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
            .collect()
    }

    /// Execute one requested tool. Failures come back as result content the
    /// model can read and recover from; they never abort the loop.
    async fn run_tool(&self, name: &str, input: &Value) -> String {
        let tool = match self.tools.iter().find(|tool| tool.name() == name) {
            Some(tool) => tool,
            None => {
                warn!(agent = self.name, tool = name, "model requested unknown tool");
                return json!({ "success": false, "error": format!("unknown tool: {name}") })
                    .to_string();
            }
        };

        debug!(agent = self.name, tool = name, "executing tool");
        match tool.execute(input.clone()).await {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(agent = self.name, tool = name, error = %e, "tool rejected input");
                json!({ "success": false, "error": e.to_string() }).to_string()
            }
        }
    }

    fn turn_cap_error(&self) -> AppError {
        AppError::Agent(format!(
            "{} agent stopped after {} tool turns without a final answer",
            self.name, self.max_turns
        ))
    }

    /// Run the converse loop to completion and return the final answer text.
    ///
    /// If the turn cap trips mid-conversation, the last assistant text seen
    /// stands in for the final answer; with no text at all this is an error.
    pub async fn invoke(&self, prompt: &str) -> AppResult<String> {
        info!(agent = self.name, prompt_len = prompt.len(), "running agent");
        let specs = self.tool_specs();
        let mut messages = vec![ChatMessage::user(prompt)];
        let mut last_text = String::new();

        for turn in 0..self.max_turns {
            let reply = self
                .adapter
                .converse(&self.system_prompt, &messages, &specs)
                .await?;

            let text = reply.text();
            if !text.is_empty() {
                last_text = text;
            }

            let requests = Self::owned_tool_uses(&reply);
            if reply.stop_reason != StopReason::ToolUse || requests.is_empty() {
                debug!(
                    agent = self.name,
                    turn,
                    reply_len = last_text.len(),
                    "agent finished"
                );
                return Ok(last_text);
            }

            let mut results = Vec::with_capacity(requests.len());
            for (id, name, input) in requests {
                let content = self.run_tool(&name, &input).await;
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id,
                    content,
                });
            }
            messages.push(ChatMessage::assistant(reply.content));
            messages.push(ChatMessage::tool_results(results));
        }

        if last_text.is_empty() {
            Err(self.turn_cap_error())
        } else {
            warn!(
                agent = self.name,
                max_turns = self.max_turns,
                "turn cap reached, returning last assistant text"
            );
            Ok(last_text)
        }
    }

    /// Run the converse loop as a native event stream.
    ///
    /// Each assistant text turn becomes a `data` event and each tool
    /// invocation a `tool_use` event, in conversation order. Model failures
    /// and the turn cap surface as an `Err` item; on success the stream just
    /// ends, with no terminal event.
    pub fn into_event_stream(
        self,
        prompt: String,
    ) -> impl Stream<Item = AppResult<AgentEvent>> + Send {
        stream! {
            info!(agent = self.name, prompt_len = prompt.len(), "running agent stream");
            let specs = self.tool_specs();
            let mut messages = vec![ChatMessage::user(prompt)];

            for turn in 0..self.max_turns {
                let reply = match self
                    .adapter
                    .converse(&self.system_prompt, &messages, &specs)
                    .await
                {
                    Ok(reply) => reply,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let text = reply.text();
                if !text.is_empty() {
                    yield Ok(AgentEvent::data(text));
                }

                let requests = Self::owned_tool_uses(&reply);
                if reply.stop_reason != StopReason::ToolUse || requests.is_empty() {
                    debug!(agent = self.name, turn, "agent stream finished");
                    return;
                }

                let mut results = Vec::with_capacity(requests.len());
                for (id, name, input) in requests {
                    yield Ok(AgentEvent::tool_use(&name, &input));
                    let content = self.run_tool(&name, &input).await;
                    results.push(ContentBlock::ToolResult {
                        tool_use_id: id,
                        content,
                    });
                }
                messages.push(ChatMessage::assistant(reply.content));
                messages.push(ChatMessage::tool_results(results));
            }

            yield Err(self.turn_cap_error());
        }
    }

    /// Run the converse loop, pushing events into a relay sink.
    ///
    /// Returns `Ok(())` once the conversation finishes or the consumer goes
    /// away; the session wrapper turns the outcome into the terminal event.
    pub async fn run_with_sink(self, prompt: &str, sink: EventSink) -> AppResult<()> {
        let name = self.name;
        let events = self.into_event_stream(prompt.to_string());
        futures::pin_mut!(events);

        while let Some(item) = events.next().await {
            if !sink.push(item?) {
                debug!(agent = name, "event consumer went away, stopping agent run");
                return Ok(());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelaySession;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed list of replies and records every conversation
    /// snapshot it was shown.
    struct ScriptedAdapter {
        replies: Mutex<VecDeque<AppResult<ModelReply>>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedAdapter {
        fn new(replies: Vec<AppResult<ModelReply>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn text(text: &str) -> AppResult<ModelReply> {
            Ok(ModelReply {
                content: vec![ContentBlock::Text {
                    text: text.to_string(),
                }],
                stop_reason: StopReason::EndTurn,
            })
        }

        fn tool_call(text: &str, name: &str, input: Value) -> AppResult<ModelReply> {
            let mut content = Vec::new();
            if !text.is_empty() {
                content.push(ContentBlock::Text {
                    text: text.to_string(),
                });
            }
            content.push(ContentBlock::ToolUse {
                id: format!("toolu_{name}"),
                name: name.to_string(),
                input,
            });
            Ok(ModelReply {
                content,
                stop_reason: StopReason::ToolUse,
            })
        }
    }

    #[async_trait]
    impl ModelAdapter for ScriptedAdapter {
        async fn converse(
            &self,
            _system: &str,
            messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> AppResult<ModelReply> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Agent("script exhausted".to_string())))
        }
    }

    struct RecordingTool {
        calls: Mutex<Vec<Value>>,
    }

    impl RecordingTool {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn name(&self) -> &str {
            "lookup"
        }

        fn description(&self) -> &str {
            "test lookup"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn execute(&self, input: Value) -> AppResult<Value> {
            self.calls.lock().unwrap().push(input);
            Ok(json!({ "success": true, "answer": "42" }))
        }
    }

    fn agent_with(adapter: Arc<ScriptedAdapter>, tools: Vec<Arc<dyn Tool>>) -> Agent {
        Agent::new("test", "You are a test agent.", tools, adapter, 4)
    }

    #[tokio::test]
    async fn test_invoke_returns_text_when_model_stops_immediately() {
        let adapter = ScriptedAdapter::new(vec![ScriptedAdapter::text("done")]);
        let agent = agent_with(adapter, vec![]);

        let answer = agent.invoke("hi").await.unwrap();
        assert_eq!(answer, "done");
    }

    #[tokio::test]
    async fn test_invoke_executes_requested_tool_and_returns_final_text() {
        let tool = RecordingTool::new();
        let adapter = ScriptedAdapter::new(vec![
            ScriptedAdapter::tool_call("Checking.", "lookup", json!({ "q": "zoro" })),
            ScriptedAdapter::text("The answer is 42."),
        ]);
        let agent = agent_with(adapter.clone(), vec![tool.clone()]);

        let answer = agent.invoke("what is it").await.unwrap();

        assert_eq!(answer, "The answer is 42.");
        assert_eq!(*tool.calls.lock().unwrap(), vec![json!({ "q": "zoro" })]);

        // Second turn carries the assistant blocks and the tool result back.
        let seen = adapter.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].len(), 3);
        assert!(matches!(
            seen[1][2].content[0],
            ContentBlock::ToolResult { ref content, .. } if content.contains("42")
        ));
    }

    #[tokio::test]
    async fn test_invoke_folds_unknown_tool_into_result() {
        let adapter = ScriptedAdapter::new(vec![
            ScriptedAdapter::tool_call("", "no_such_tool", json!({})),
            ScriptedAdapter::text("recovered"),
        ]);
        let agent = agent_with(adapter.clone(), vec![]);

        let answer = agent.invoke("hi").await.unwrap();
        assert_eq!(answer, "recovered");

        let seen = adapter.seen.lock().unwrap();
        assert!(matches!(
            seen[1][2].content[0],
            ContentBlock::ToolResult { ref content, .. } if content.contains("unknown tool")
        ));
    }

    #[tokio::test]
    async fn test_invoke_turn_cap_without_text_is_an_error() {
        let replies = (0..4)
            .map(|_| ScriptedAdapter::tool_call("", "lookup", json!({})))
            .collect();
        let agent = agent_with(ScriptedAdapter::new(replies), vec![RecordingTool::new()]);

        let err = agent.invoke("loop forever").await.unwrap_err();
        assert!(matches!(err, AppError::Agent(_)));
    }

    #[tokio::test]
    async fn test_invoke_turn_cap_returns_last_text_when_present() {
        let replies = (0..4)
            .map(|_| ScriptedAdapter::tool_call("still working", "lookup", json!({})))
            .collect();
        let agent = agent_with(ScriptedAdapter::new(replies), vec![RecordingTool::new()]);

        let answer = agent.invoke("loop forever").await.unwrap();
        assert_eq!(answer, "still working");
    }

    #[tokio::test]
    async fn test_event_stream_emits_data_and_tool_use_in_order() {
        let tool = RecordingTool::new();
        let adapter = ScriptedAdapter::new(vec![
            ScriptedAdapter::tool_call("Looking that up.", "lookup", json!({ "q": "x" })),
            ScriptedAdapter::text("Found it."),
        ]);
        let agent = agent_with(adapter, vec![tool]);

        let events: Vec<AppResult<AgentEvent>> =
            agent.into_event_stream("q".to_string()).collect().await;
        let events: Vec<AgentEvent> = events.into_iter().map(|e| e.unwrap()).collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].data_text(), Some("Looking that up."));
        assert!(events[1].payload.contains_key("tool_use"));
        assert_eq!(events[2].data_text(), Some("Found it."));
        assert!(events.iter().all(|e| !e.is_terminal()));
    }

    #[tokio::test]
    async fn test_event_stream_surfaces_model_failure_as_err_item() {
        let adapter =
            ScriptedAdapter::new(vec![Err(AppError::ModelApi("status 529".to_string()))]);
        let agent = agent_with(adapter, vec![]);

        let events: Vec<AppResult<AgentEvent>> =
            agent.into_event_stream("q".to_string()).collect().await;

        assert_eq!(events.len(), 1);
        assert!(events[0].is_err());
    }

    #[tokio::test]
    async fn test_run_with_sink_feeds_relay_session() {
        let tool = RecordingTool::new();
        let adapter = ScriptedAdapter::new(vec![
            ScriptedAdapter::tool_call("Working.", "lookup", json!({})),
            ScriptedAdapter::text("All done."),
        ]);
        let agent = agent_with(adapter, vec![tool]);

        let session =
            RelaySession::spawn(move |sink| async move { agent.run_with_sink("q", sink).await });
        let lines: Vec<String> = session.into_line_stream().collect().await;

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Working."));
        assert!(lines[1].contains("tool_use"));
        assert!(lines[2].contains("All done."));
        assert_eq!(lines[3].trim(), r#"{"complete":true}"#);
    }
}
