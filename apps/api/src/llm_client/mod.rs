//! Model Client: the single point of entry for all language-model calls.
//!
//! ARCHITECTURAL RULE: No other module may talk to the model service directly.
//! Callers hand a prompt to `ModelClient::generate` and get raw text back;
//! turning that text into structure is the interpreter's job.
//!
//! Transports are strategies behind `ModelTransport`. Which ones run, and in
//! what order, is decided once at startup from `MODEL_TRANSPORT`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod http;
pub mod process;
pub mod prompts;

use http::OllamaHttpTransport;
use process::OllamaProcessTransport;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model invocation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to run model process: {0}")]
    Process(#[from] std::io::Error),

    #[error("model process exited with code {code}: {stderr}")]
    ProcessExit { code: i32, stderr: String },

    #[error("model returned empty content")]
    EmptyContent,

    #[error("no model transport configured")]
    NoTransport,
}

impl ModelError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ModelError::Timeout(_) => true,
            ModelError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// A single model invocation: which model, and the full prompt text.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
}

/// One way of reaching the model service. Implementations return the raw reply text.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<String, ModelError>;
}

/// Which transports to use, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Http,
    Process,
    /// HTTP first; a non-timeout HTTP failure moves on to the process transport.
    HttpThenProcess,
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(TransportMode::Http),
            "process" => Ok(TransportMode::Process),
            "http_then_process" => Ok(TransportMode::HttpThenProcess),
            other => Err(format!(
                "unknown model transport '{other}' (expected http, process or http_then_process)"
            )),
        }
    }
}

#[derive(Clone)]
pub struct ModelClient {
    model: String,
    transports: Vec<Arc<dyn ModelTransport>>,
    timeout: Duration,
}

impl ModelClient {
    pub fn new(
        model: impl Into<String>,
        transports: Vec<Arc<dyn ModelTransport>>,
        timeout: Duration,
    ) -> Self {
        Self {
            model: model.into(),
            transports,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = || -> anyhow::Result<Arc<dyn ModelTransport>> {
            Ok(Arc::new(OllamaHttpTransport::new(
                &config.ollama_host,
                config.ollama_port,
            )?))
        };
        let process =
            || -> Arc<dyn ModelTransport> { Arc::new(OllamaProcessTransport::new(&config.ollama_bin)) };

        let transports = match config.model_transport {
            TransportMode::Http => vec![http()?],
            TransportMode::Process => vec![process()],
            TransportMode::HttpThenProcess => vec![http()?, process()],
        };

        Ok(Self::new(
            config.model_name.clone(),
            transports,
            config.model_timeout,
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport_names(&self) -> Vec<&'static str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// Sends `prompt` to the model and returns the raw reply.
    ///
    /// Every transport attempt is bounded by the same timeout. A timeout
    /// abandons the call; any other failure moves on to the next transport.
    pub async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ModelRequest {
            model: &self.model,
            prompt,
        };
        let mut last_error = None;

        for transport in &self.transports {
            match tokio::time::timeout(self.timeout, transport.invoke(request)).await {
                Err(_) => {
                    warn!(
                        "Model call via {} timed out after {}s",
                        transport.name(),
                        self.timeout.as_secs()
                    );
                    return Err(ModelError::Timeout(self.timeout));
                }
                Ok(Ok(text)) if text.trim().is_empty() => {
                    warn!("Model call via {} returned empty content", transport.name());
                    last_error = Some(ModelError::EmptyContent);
                }
                Ok(Ok(text)) => {
                    debug!(
                        "Model call via {} succeeded ({} chars)",
                        transport.name(),
                        text.len()
                    );
                    return Ok(text);
                }
                Ok(Err(e)) if e.is_timeout() => {
                    warn!("Model call via {} timed out: {e}", transport.name());
                    return Err(ModelError::Timeout(self.timeout));
                }
                Ok(Err(e)) => {
                    warn!("Model call via {} failed: {e}", transport.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ModelError::NoTransport))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a canned reply and counts invocations.
    pub(crate) struct ScriptedTransport {
        pub reply: Result<String, u16>,
        pub calls: AtomicUsize,
    }

    impl ScriptedTransport {
        pub(crate) fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ModelTransport for ScriptedTransport {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn invoke(&self, _request: ModelRequest<'_>) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ModelError::Api {
                    status: *status,
                    message: "scripted failure".to_string(),
                }),
            }
        }
    }

    /// Never answers within any reasonable timeout.
    pub(crate) struct StalledTransport;

    #[async_trait]
    impl ModelTransport for StalledTransport {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn invoke(&self, _request: ModelRequest<'_>) -> Result<String, ModelError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }
    }

    pub(crate) fn client_with(transports: Vec<Arc<dyn ModelTransport>>) -> ModelClient {
        ModelClient::new("deepseek-r1:1.5b", transports, Duration::from_secs(60))
    }

    #[test]
    fn test_transport_mode_parse() {
        assert_eq!("http".parse::<TransportMode>(), Ok(TransportMode::Http));
        assert_eq!(
            " HTTP_THEN_PROCESS ".parse::<TransportMode>(),
            Ok(TransportMode::HttpThenProcess)
        );
        assert!("grpc".parse::<TransportMode>().is_err());
    }

    #[tokio::test]
    async fn test_generate_returns_first_success() {
        let primary = ScriptedTransport::ok("{\"ok\": true}");
        let client = client_with(vec![primary.clone()]);
        assert_eq!(client.generate("prompt").await.unwrap(), "{\"ok\": true}");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_falls_back_to_second_transport() {
        let primary = ScriptedTransport::failing(500);
        let secondary = ScriptedTransport::ok("from process");
        let client = client_with(vec![primary.clone(), secondary.clone()]);

        assert_eq!(client.generate("prompt").await.unwrap(), "from process");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_moves_to_next_transport() {
        let primary = ScriptedTransport::ok("   ");
        let secondary = ScriptedTransport::ok("real reply");
        let client = client_with(vec![primary, secondary]);
        assert_eq!(client.generate("prompt").await.unwrap(), "real reply");
    }

    #[tokio::test]
    async fn test_all_transports_failing_returns_last_error() {
        let client = client_with(vec![
            ScriptedTransport::failing(500),
            ScriptedTransport::failing(503),
        ]);
        match client.generate("prompt").await {
            Err(ModelError::Api { status, .. }) => assert_eq!(status, 503),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_abandons_without_trying_next_transport() {
        let secondary = ScriptedTransport::ok("never used");
        let client = client_with(vec![Arc::new(StalledTransport), secondary.clone()]);

        let err = client.generate("prompt").await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_transport_configured() {
        let client = client_with(vec![]);
        assert!(matches!(
            client.generate("prompt").await,
            Err(ModelError::NoTransport)
        ));
    }
}
