/// LLM Client: the single point of entry for language-model inference calls.
///
/// ARCHITECTURAL RULE: No other module may talk to the inference endpoint directly.
/// All LLM interactions MUST go through this module.
///
/// Speaks the Ollama `/api/generate` protocol (non-streaming). Each `call` issues
/// exactly one request; retry policy belongs to the caller.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Inference endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Endpoint, model and sampling settings. Built from `Config`, never read from the environment here.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

impl LlmResponse {
    /// The generated text, or `None` when the model produced only whitespace.
    pub fn text(&self) -> Option<&str> {
        let text = self.response.trim();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// The single LLM client used by the rewrite path.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    /// Makes a single generate call, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = GenerateRequest {
            model: &self.settings.model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions {
                temperature: self.settings.temperature,
            },
        };

        let url = format!(
            "{}{}",
            self.settings.endpoint.trim_end_matches('/'),
            GENERATE_PATH
        );

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await.map_err(|e| self.classify(e))?;

        debug!(
            "LLM call succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
            llm_response.model, llm_response.prompt_eval_count, llm_response.eval_count
        );

        Ok(llm_response)
    }

    /// Convenience method returning only the trimmed generated text.
    pub async fn generate_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    fn classify(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.settings.timeout)
        } else if err.is_connect() {
            LlmError::Unreachable(err.to_string())
        } else {
            LlmError::Http(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub(crate) async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub(crate) fn settings(endpoint: String, timeout: Duration) -> LlmSettings {
        LlmSettings {
            endpoint,
            model: "llama3.2:3b".to_string(),
            temperature: 0.3,
            timeout,
        }
    }

    #[test]
    fn test_response_text_trims_and_rejects_blank() {
        let response: LlmResponse = serde_json::from_value(json!({
            "model": "llama3.2:3b",
            "response": "  Led ETL migration  \n",
            "done": true
        }))
        .unwrap();
        assert_eq!(response.text(), Some("Led ETL migration"));

        let blank: LlmResponse =
            serde_json::from_value(json!({"model": "m", "response": "   "})).unwrap();
        assert_eq!(blank.text(), None);
    }

    #[tokio::test]
    async fn test_call_sends_model_prompt_and_system() {
        let router = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "llama3.2:3b");
                assert_eq!(body["stream"], false);
                assert_eq!(body["system"], "be brief");
                let echoed = format!("echo: {}", body["prompt"].as_str().unwrap_or_default());
                Json(json!({"model": "llama3.2:3b", "response": echoed, "eval_count": 4}))
            }),
        );
        let base = spawn_stub(router).await;
        let client = LlmClient::new(settings(base, Duration::from_secs(5))).unwrap();

        let text = client.generate_text("hello", "be brief").await.unwrap();
        assert_eq!(text, "echo: hello");
    }

    #[tokio::test]
    async fn test_call_surfaces_api_error_message() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "model 'llama3.2:3b' not found"})),
                )
            }),
        );
        let base = spawn_stub(router).await;
        let client = LlmClient::new(settings(base, Duration::from_secs(5))).unwrap();

        match client.call("hi", "sys").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert!(message.contains("not found"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            LlmClient::new(settings(format!("http://{addr}"), Duration::from_secs(5))).unwrap();
        let err = client.call("hi", "sys").await.unwrap_err();
        assert!(matches!(err, LlmError::Unreachable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"model": "m", "response": "late"}))
            }),
        );
        let base = spawn_stub(router).await;
        let client = LlmClient::new(settings(base, Duration::from_millis(200))).unwrap();

        let err = client.call("hi", "sys").await.unwrap_err();
        assert!(
            matches!(err, LlmError::Timeout(d) if d == Duration::from_millis(200)),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_blank_generation_is_empty_content() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({"model": "m", "response": "\n\n"})) }),
        );
        let base = spawn_stub(router).await;
        let client = LlmClient::new(settings(base, Duration::from_secs(5))).unwrap();

        let err = client.generate_text("hi", "sys").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
