// Relay event model

use serde_json::{json, Map, Value};

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// One unit of producer output.
///
/// Two reserved fields carry relay-control meaning: `complete` marks a
/// successful end of stream, `error` (with `message`) a failed one. Everything
/// else rides in the flattened payload map and is opaque to the relay. On the
/// wire a data event is `{"data":"..."}`, a completion `{"complete":true}`,
/// an error `{"error":true,"message":"..."}`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AgentEvent {
    #[serde(default, skip_serializing_if = "is_false")]
    pub complete: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl AgentEvent {
    /// Event carrying a chunk of assistant text under the `data` key
    pub fn data(text: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("data".to_string(), Value::String(text.into()));
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Event announcing a tool invocation
    pub fn tool_use(name: &str, input: &Value) -> Self {
        let mut payload = Map::new();
        payload.insert("tool_use".to_string(), json!({ "name": name, "input": input }));
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Terminal completion marker
    pub fn completion() -> Self {
        Self {
            complete: true,
            ..Self::default()
        }
    }

    /// Terminal error marker with a descriptive message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Attach an arbitrary payload field
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.complete || self.error
    }

    /// Text under the `data` payload key, if any
    pub fn data_text(&self) -> Option<&str> {
        self.payload.get("data").and_then(Value::as_str)
    }

    /// Encode as one NDJSON wire line
    pub fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"error":true,"message":"failed to encode event"}"#.to_string()
        });
        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_event_wire_shape() {
        let event = AgentEvent::data("hello");
        let value: Value = serde_json::from_str(event.to_line().trim()).unwrap();
        assert_eq!(value, json!({ "data": "hello" }));
        assert!(!event.is_terminal());
        assert_eq!(event.data_text(), Some("hello"));
    }

    #[test]
    fn test_completion_wire_shape() {
        let event = AgentEvent::completion();
        let value: Value = serde_json::from_str(event.to_line().trim()).unwrap();
        assert_eq!(value, json!({ "complete": true }));
        assert!(event.is_terminal());
    }

    #[test]
    fn test_error_wire_shape() {
        let event = AgentEvent::error("bad upstream");
        let value: Value = serde_json::from_str(event.to_line().trim()).unwrap();
        assert_eq!(value, json!({ "error": true, "message": "bad upstream" }));
        assert!(event.is_terminal());
    }

    #[test]
    fn test_line_is_newline_terminated() {
        assert!(AgentEvent::data("x").to_line().ends_with('\n'));
        assert!(AgentEvent::completion().to_line().ends_with('\n'));
    }

    #[test]
    fn test_open_payload_roundtrip() {
        let event = AgentEvent::data("chunk").with("turn", json!(3));
        let parsed: AgentEvent = serde_json::from_str(event.to_line().trim()).unwrap();
        assert_eq!(parsed.data_text(), Some("chunk"));
        assert_eq!(parsed.payload.get("turn"), Some(&json!(3)));
        assert!(!parsed.complete && !parsed.error);
    }

    #[test]
    fn test_control_fields_parse_from_wire() {
        let parsed: AgentEvent =
            serde_json::from_str(r#"{"error":true,"message":"boom","data":"tail"}"#).unwrap();
        assert!(parsed.error);
        assert_eq!(parsed.message.as_deref(), Some("boom"));
        assert_eq!(parsed.data_text(), Some("tail"));
    }
}
