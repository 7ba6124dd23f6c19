// Plain HTTP GET tool for the weather agent

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::tools::Tool;
use crate::types::AppResult;

// Responses are fed back into the model context, so cap them.
const MAX_BODY_CHARS: usize = 20_000;

/// Fetches a URL and returns the body text.
///
/// Network and status failures come back inside the payload so the model can
/// react to them; this tool never fails the agent turn.
pub struct HttpRequestTool {
    client: Client,
}

#[derive(Deserialize)]
struct HttpInput {
    url: String,
}

impl HttpRequestTool {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for HttpRequestTool {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Perform an HTTP GET request and return the response body as text. Use this to \
         call public JSON APIs such as api.weather.gov (points lookup, then the forecast \
         URL from its response)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Absolute URL to fetch" }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value) -> AppResult<Value> {
        let input: HttpInput = serde_json::from_value(input)?;
        info!(url = %input.url, "http_request fetch");

        let response = match self
            .client
            .get(&input.url)
            .header("User-Agent", "deckhand/0.1 (weather lookup)")
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Ok(json!({
                    "success": false,
                    "error": format!("Request to {} failed: {}", input.url, e)
                }));
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_BODY_CHARS).collect();

        if !status.is_success() {
            return Ok(json!({
                "success": false,
                "status": status.as_u16(),
                "error": format!("GET {} returned {}", input.url, status),
                "body": body
            }));
        }

        Ok(json!({
            "success": true,
            "status": status.as_u16(),
            "body": body
        }))
    }
}
