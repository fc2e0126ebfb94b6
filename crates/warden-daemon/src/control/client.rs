use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use warden_types::{Command, CommandRequest, CommandResponse, MAX_RESPONSE_BYTES};

use crate::config::SupervisorConfig;

/// Client side of the control protocol, used by the CLI and by collaborators
/// embedding the library.
///
/// Transport problems never surface as errors: they come back as failure
/// responses so callers handle a single shape.
#[derive(Clone, Debug)]
pub struct SupervisorClient {
    socket: PathBuf,
    timeout: Duration,
    max_response: usize,
}

impl SupervisorClient {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
            timeout: Duration::from_secs(5),
            max_response: MAX_RESPONSE_BYTES,
        }
    }

    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self {
            socket: config.paths.socket(),
            timeout: config.control.client_timeout(),
            max_response: config.control.max_response_bytes,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    pub async fn send(&self, command: Command) -> CommandResponse {
        let request = CommandRequest::new(command);
        match serde_json::to_string(&request) {
            Ok(payload) => self.send_raw(&payload).await,
            Err(e) => CommandResponse::failure(format!("Invalid request: {}", e)),
        }
    }

    /// Sends an arbitrary payload. Exposed for protocol-level callers that
    /// need to pass through tags the client does not know.
    pub async fn send_raw(&self, payload: &str) -> CommandResponse {
        if !self.socket.exists() {
            return CommandResponse::failure("Supervisor not running (socket not found)");
        }

        match tokio::time::timeout(self.timeout, self.exchange(payload)).await {
            Err(_) => CommandResponse::failure("Supervisor request timed out"),
            Ok(Err(e)) => CommandResponse::failure(format!("Socket communication error: {}", e)),
            Ok(Ok(raw)) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                CommandResponse::failure(format!("Invalid response from supervisor: {}", e))
            }),
        }
    }

    async fn exchange(&self, payload: &str) -> std::io::Result<Vec<u8>> {
        let mut stream = UnixStream::connect(&self.socket).await?;
        stream.write_all(payload.as_bytes()).await?;
        stream.shutdown().await?;

        let mut raw = Vec::new();
        (&mut stream)
            .take(self.max_response as u64)
            .read_to_end(&mut raw)
            .await?;
        Ok(raw)
    }
}
