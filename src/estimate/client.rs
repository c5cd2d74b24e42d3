use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::EstimationError;

/// Upper bound on how much of an error body we keep for display.
const ERROR_BODY_LIMIT: usize = 500;

// ---------------------------------------------------------------------------
// Wire types (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// ChatModel – the external text-generation capability
// ---------------------------------------------------------------------------

/// A text-generation backend. Implementations make exactly one attempt per
/// call and report every failure as an [`EstimationError`].
pub trait ChatModel {
    /// Identifier sent with each request (shown in logs).
    fn model_id(&self) -> &str;

    /// Generate a reply to `messages` and return its text verbatim.
    fn complete(&self, messages: &[ChatMessage], temperature: f64) -> Result<String, EstimationError>;
}

/// Blocking client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompatClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatClient {
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_http(config, Client::new())
    }

    /// Use a preconfigured HTTP client (proxy, TLS, timeouts…).
    pub fn with_http(config: &ModelConfig, http: Client) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl ChatModel for OpenAiCompatClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn complete(&self, messages: &[ChatMessage], temperature: f64) -> Result<String, EstimationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(EstimationError::MissingApiKey)?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(EstimationError::Transport)?;

        let status = resp.status();
        let text = resp.text().map_err(EstimationError::Transport)?;

        if !status.is_success() {
            return Err(EstimationError::Status {
                status,
                body: truncate(&text, ERROR_BODY_LIMIT),
            });
        }

        parse_completion(&text)
    }
}

/// Extract the first choice's content from a completion body.
fn parse_completion(body: &str) -> Result<String, EstimationError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| EstimationError::Malformed(e.to_string()))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| EstimationError::Malformed("response has no choices".to_string()))?;

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(EstimationError::EmptyResponse),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(base_url: String, api_key: Option<&str>) -> ModelConfig {
        ModelConfig {
            api_key: api_key.map(str::to_string),
            base_url,
            model: "test-model".to_string(),
        }
    }

    fn client(base_url: String, api_key: Option<&str>) -> OpenAiCompatClient {
        // Keep test traffic off any proxy configured in the environment.
        let http = Client::builder().no_proxy().build().unwrap();
        OpenAiCompatClient::with_http(&config(base_url, api_key), http)
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("be brief"), ChatMessage::user("estimate")]
    }

    #[test]
    fn request_body_shape() {
        let msgs = messages();
        let body = ChatCompletionRequest {
            model: "m",
            messages: &msgs,
            temperature: 0.1,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "estimate"}
                ],
                "temperature": 0.1
            })
        );
    }

    #[test]
    fn successful_completion_is_returned_verbatim() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "id": "chatcmpl-1",
                    "object": "chat.completion",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "  约 800–1200 元/吨\n"},
                        "finish_reason": "stop"
                    }]
                }));
        });

        let client = client(server.url("/v1/"), Some("test-key"));
        let text = client.complete(&messages(), 0.1).unwrap();

        mock.assert();
        assert_eq!(text, "  约 800–1200 元/吨\n");
    }

    #[test]
    fn auth_failure_is_a_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401)
                .json_body(json!({"error": {"message": "Invalid Authentication"}}));
        });

        let client = client(server.url("/v1"), Some("wrong"));
        let err = client.complete(&messages(), 0.1).unwrap_err();
        assert!(err.is_auth_failure());
        match err {
            EstimationError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Invalid Authentication"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_and_empty_bodies() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/bad/chat/completions");
            then.status(200).body("<html>gateway</html>");
        });
        server.mock(|when, then| {
            when.method(POST).path("/empty/chat/completions");
            then.status(200)
                .json_body(json!({"choices": [{"message": {"role": "assistant", "content": ""}}]}));
        });

        let bad = client(server.url("/bad"), Some("k"));
        assert!(matches!(
            bad.complete(&messages(), 0.1),
            Err(EstimationError::Malformed(_))
        ));

        let empty = client(server.url("/empty"), Some("k"));
        assert!(matches!(
            empty.complete(&messages(), 0.1),
            Err(EstimationError::EmptyResponse)
        ));
    }

    #[test]
    fn transport_failure_is_reported() {
        // Nothing listens on the discard port.
        let client = client("http://127.0.0.1:9".into(), Some("k"));
        let err = client.complete(&messages(), 0.1).unwrap_err();
        assert!(matches!(err, EstimationError::Transport(_)));
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let client = client("http://127.0.0.1:9".into(), None);
        assert!(matches!(
            client.complete(&messages(), 0.1),
            Err(EstimationError::MissingApiKey)
        ));
    }

    #[test]
    fn no_choices_is_malformed() {
        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(EstimationError::Malformed(_))
        ));
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
