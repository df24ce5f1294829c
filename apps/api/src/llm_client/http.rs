use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm_client::{ModelError, ModelRequest, ModelTransport};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Ollama `/api/generate` over HTTP, non-streaming.
///
/// No per-request timeout on the reqwest client: `ModelClient` bounds every
/// attempt with its own deadline.
pub struct OllamaHttpTransport {
    client: Client,
    url: String,
}

impl OllamaHttpTransport {
    pub fn new(host: &str, port: u16) -> Result<Self, ModelError> {
        Ok(Self {
            client: Client::builder().build()?,
            url: generate_url(host, port),
        })
    }
}

fn generate_url(host: &str, port: u16) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}:{port}/api/generate")
    } else {
        format!("http://{host}:{port}/api/generate")
    }
}

#[async_trait]
impl ModelTransport for OllamaHttpTransport {
    fn name(&self) -> &'static str {
        "ollama-http"
    }

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<String, ModelError> {
        let response = self
            .client
            .post(&self.url)
            .json(&GenerateRequest {
                model: request.model,
                prompt: request.prompt,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response.trim().to_string())
    }
}
