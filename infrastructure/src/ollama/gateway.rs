//! Ollama LLM Gateway implementation

use super::protocol::{ChatOptions, ChatRequest, ChatResponse, ErrorBody};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sre_application::ports::llm_gateway::{GatewayError, LlmGateway};
use sre_domain::Message;
use sre_domain::util::preview;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "mistral:latest";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Normalize a configured host into a base URL: empty means the local
/// default, a missing scheme means `http://`, trailing slashes are dropped.
pub fn normalize_host(host: &str) -> String {
    let mut host = host.trim().to_string();
    if host.is_empty() {
        host = DEFAULT_HOST.to_string();
    }
    if !host.starts_with("http://") && !host.starts_with("https://") {
        host = format!("http://{host}");
    }
    host.trim_end_matches('/').to_string()
}

/// LLM Gateway implementation for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaGateway {
    client: Client,
    base_url: String,
    model: String,
    options: ChatOptions,
}

impl OllamaGateway {
    pub fn new(
        host: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        let base_url = normalize_host(host);
        let model = model.into();

        info!("OllamaGateway initialized: {} ({})", base_url, model);

        Ok(Self {
            client,
            base_url,
            model,
            options: ChatOptions::default(),
        })
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.options.temperature = temperature;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_connect() {
            GatewayError::ConnectionError(format!(
                "cannot reach Ollama at {}: {}",
                self.base_url, e
            ))
        } else {
            GatewayError::RequestFailed(e.to_string())
        }
    }

    fn map_status(&self, status: StatusCode, body: &str) -> GatewayError {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| preview(body.trim(), 300).into_owned());

        if status == StatusCode::NOT_FOUND {
            GatewayError::ModelNotAvailable(format!("{}: {}", self.model, detail))
        } else {
            GatewayError::RequestFailed(format!("HTTP {}: {}", status, detail))
        }
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, system: &str, messages: &[Message]) -> Result<String, GatewayError> {
        let request =
            ChatRequest::new(&self.model, system, messages).with_options(self.options.clone());
        debug!(
            "POST {} with {} message(s)",
            self.endpoint("chat"),
            request.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        if !status.is_success() {
            return Err(self.map_status(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("{}: {}", e, preview(&body, 200)))
        })?;
        debug!(
            "Model replied ({} bytes, done={})",
            parsed.message.content.len(),
            parsed.done
        );
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> OllamaGateway {
        OllamaGateway::new(&server.uri(), "mistral:latest", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host(""), DEFAULT_HOST);
        assert_eq!(normalize_host("  "), DEFAULT_HOST);
        assert_eq!(normalize_host("gpu-box:11434"), "http://gpu-box:11434");
        assert_eq!(
            normalize_host("https://ollama.internal/"),
            "https://ollama.internal"
        );
    }

    #[tokio::test]
    async fn test_chat_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "mistral:latest",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "list alerts"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "mistral:latest",
                "message": {"role": "assistant", "content": "{\"tool_name\": \"get_monitors\"}"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = gateway(&server)
            .chat("sys", &[Message::user("list alerts")])
            .await
            .unwrap();
        assert_eq!(reply, "{\"tool_name\": \"get_monitors\"}");
    }

    #[tokio::test]
    async fn test_temperature_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"options": {"temperature": 0.5}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "ok"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = gateway(&server)
            .with_temperature(Some(0.5))
            .chat("sys", &[])
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn test_missing_model_is_model_not_available() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(
                    json!({"error": "model \"mistral:latest\" not found, try pulling it first"}),
                ),
            )
            .mount(&server)
            .await;

        let err = gateway(&server).chat("sys", &[]).await.unwrap_err();
        match err {
            GatewayError::ModelNotAvailable(msg) => assert!(msg.contains("try pulling it first")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = gateway(&server).chat("sys", &[]).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::RequestFailed("HTTP 500 Internal Server Error: boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = gateway(&server).chat("sys", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": {"content": "late"}}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let gateway =
            OllamaGateway::new(&server.uri(), "mistral:latest", Duration::from_millis(200))
                .unwrap();
        let err = gateway.chat("sys", &[]).await.unwrap_err();
        assert_eq!(err, GatewayError::Timeout);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        // Bind then drop to get a port nobody listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let gateway = OllamaGateway::new(
            &format!("127.0.0.1:{port}"),
            "mistral:latest",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = gateway.chat("sys", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionError(_)));
    }
}
