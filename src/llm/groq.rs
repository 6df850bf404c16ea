//! Groq provider implementation
//!
//! Groq exposes an `OpenAI`-compatible chat completions endpoint, so the wire
//! types here follow that format.

use super::types::{LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default chat completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq chat completions client
pub struct GroqService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqService {
    /// Build the client once; it is shared by every turn afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    fn translate_request(request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }

        for msg in &request.messages {
            let role = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            };
            messages.push(ChatMessage {
                role: role.to_string(),
                content: Some(msg.content.clone()),
            });
        }

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }

    fn normalize_response(resp: ChatResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("No choices in response"))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| LlmError::unknown("Completion contained no text"))?;

        let end_turn = choice.finish_reason.as_deref() == Some("stop");
        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_tokens),
            output_tokens: u64::from(u.completion_tokens),
        });

        Ok(LlmResponse {
            text,
            end_turn,
            usage,
        })
    }

    /// Pull Groq's error message out of a failure body, falling back to the
    /// raw body.
    fn classify_failure(status: StatusCode, body: &str) -> LlmError {
        let detail = serde_json::from_str::<ChatErrorResponse>(body)
            .map_or_else(|_| body.trim().to_string(), |e| e.error.message);
        LlmError::from_status(status, &detail)
    }
}

#[async_trait]
impl LlmService for GroqService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let chat_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_failure(status, &body));
        }

        let chat_response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(chat_response)
    }

    fn provider_name(&self) -> &str {
        "Groq"
    }
}

// Chat completions wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatError,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::super::{LlmErrorKind, LlmMessage};
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn request() -> LlmRequest {
        LlmRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            system: Some("roast them".to_string()),
            messages: vec![LlmMessage::user("I bought a boat")],
            temperature: Some(0.9),
            max_tokens: Some(150),
        }
    }

    /// Serve a canned reply on a loopback port, capturing the last request body.
    async fn spawn_provider(status: u16, reply: Value) -> (String, Arc<Mutex<Option<Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let status = AxumStatus::from_u16(status).unwrap();

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let captured = captured.clone();
                let reply = reply.clone();
                async move {
                    *captured.lock().unwrap() = Some(body);
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v1/chat/completions"), seen)
    }

    fn service(url: &str) -> GroqService {
        GroqService::new("test-key", url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_translate_request_puts_system_first() {
        let mut req = request();
        req.messages.push(LlmMessage::assistant("earlier reply"));

        let wire = GroqService::translate_request(&req);
        let value = serde_json::to_value(&wire).unwrap();

        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["max_tokens"], 150);
        assert_eq!(value["stream"], false);
        let roles: Vec<_> = wire.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(wire.messages[0].content.as_deref(), Some("roast them"));
    }

    #[test]
    fn test_translate_request_without_system_or_sampling() {
        let req = LlmRequest {
            system: None,
            temperature: None,
            max_tokens: None,
            ..request()
        };
        let value = serde_json::to_value(GroqService::translate_request(&req)).unwrap();

        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        assert!(value.get("temperature").is_none());
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_normalize_response_rejects_missing_content() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "stop"}]
        }))
        .unwrap();
        let err = GroqService::normalize_response(resp).unwrap_err();
        assert!(err.message.contains("no text"));

        let resp: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(GroqService::normalize_response(resp).is_err());
    }

    #[test]
    fn test_classify_failure_keeps_status_in_message() {
        let err = GroqService::classify_failure(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#,
        );
        assert_eq!(err.kind, LlmErrorKind::Auth);
        assert_eq!(err.message, "401 Unauthorized: Invalid API Key");

        let err = GroqService::classify_failure(StatusCode::SERVICE_UNAVAILABLE, "upstream down\n");
        assert_eq!(err.kind, LlmErrorKind::Upstream);
        assert_eq!(err.message, "503 Service Unavailable: upstream down");

        let err = GroqService::classify_failure(StatusCode::NOT_FOUND, "");
        assert_eq!(err.kind, LlmErrorKind::Rejected);
    }

    #[tokio::test]
    async fn test_complete_success_over_http() {
        let (url, seen) = spawn_provider(
            200,
            json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "A boat? Bold plan for someone who can't float a budget."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 42, "completion_tokens": 17, "total_tokens": 59}
            }),
        )
        .await;

        let response = service(&url).complete(&request()).await.unwrap();
        assert_eq!(
            response.text,
            "A boat? Bold plan for someone who can't float a budget."
        );
        assert!(response.end_turn);
        assert_eq!(response.usage.input_tokens, 42);
        assert_eq!(response.usage.output_tokens, 17);

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "I bought a boat");
    }

    #[tokio::test]
    async fn test_complete_rate_limited_over_http() {
        let (url, _) = spawn_provider(
            429,
            json!({"error": {"message": "Rate limit reached for model"}}),
        )
        .await;

        let err = service(&url).complete(&request()).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::RateLimit);
        assert!(err.message.starts_with("429 Too Many Requests"));
    }

    #[tokio::test]
    async fn test_complete_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = service(&format!("http://{addr}/"))
            .complete(&request())
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Network);
    }
}
