use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::llm_client::{ModelError, ModelRequest, ModelTransport};

/// `<bin> run <model>` with the prompt on stdin and the reply on stdout.
///
/// The child is killed when the future is dropped, so the client's timeout
/// also terminates the process.
pub struct OllamaProcessTransport {
    bin: String,
}

impl OllamaProcessTransport {
    pub fn new(bin: &str) -> Self {
        Self {
            bin: bin.to_string(),
        }
    }
}

#[async_trait]
impl ModelTransport for OllamaProcessTransport {
    fn name(&self) -> &'static str {
        "ollama-process"
    }

    async fn invoke(&self, request: ModelRequest<'_>) -> Result<String, ModelError> {
        let mut child = Command::new(&self.bin)
            .arg("run")
            .arg(request.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits early closes its end; its exit status says more than EPIPE.
            if let Err(e) = stdin.write_all(request.prompt.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(ModelError::ProcessExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_process_error() {
        let transport = OllamaProcessTransport::new("/nonexistent/ollama-binary");
        let err = transport
            .invoke(ModelRequest {
                model: "m",
                prompt: "p",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Process(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let transport = OllamaProcessTransport::new("false");
        let err = transport
            .invoke(ModelRequest {
                model: "m",
                prompt: "p",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::ProcessExit { .. }));
    }
}
