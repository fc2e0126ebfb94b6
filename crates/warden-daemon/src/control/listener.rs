use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};
use warden_types::{CommandRequest, CommandResponse, WardenError, WardenResult};

use crate::config::SupervisorConfig;
use crate::supervisor::{CancellationToken, Supervisor};

/// Request-size and read-time bounds applied to every connection.
#[derive(Clone, Copy, Debug)]
struct ConnectionLimits {
    max_request: usize,
    max_response: usize,
    read_timeout: Duration,
}

/// Bound control socket. One JSON request and one JSON response per
/// connection.
pub struct ControlListener {
    listener: UnixListener,
    path: PathBuf,
    limits: ConnectionLimits,
}

impl ControlListener {
    /// Replaces any stale socket file, binds and opens up the permissions so
    /// collaborators running as other users can connect.
    pub fn bind(config: &SupervisorConfig) -> WardenResult<Self> {
        let path = config.paths.socket();

        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                WardenError::Control(format!("Failed to remove stale socket {:?}: {}", path, e))
            })?;
        }

        let listener = UnixListener::bind(&path)
            .map_err(|e| WardenError::Control(format!("Failed to bind {:?}: {}", path, e)))?;

        std::fs::set_permissions(
            &path,
            std::fs::Permissions::from_mode(config.control.socket_mode),
        )
        .map_err(|e| WardenError::Control(format!("Failed to set socket permissions: {}", e)))?;

        info!("Control socket listening on {:?}", path);

        Ok(Self {
            listener,
            path,
            limits: ConnectionLimits {
                max_request: config.control.max_request_bytes,
                max_response: config.control.max_response_bytes,
                read_timeout: config.control.client_timeout(),
            },
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Accepts until `shutdown` fires, then removes the socket file.
    pub async fn serve(self, supervisor: Arc<Supervisor>, mut shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        let supervisor = Arc::clone(&supervisor);
                        let limits = self.limits;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &supervisor, limits).await {
                                debug!("Control connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Control socket accept failed: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
            }
        }

        drop(self.listener);
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove control socket: {}", e);
            }
        }
        info!("Control socket closed");
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    supervisor: &Supervisor,
    limits: ConnectionLimits,
) -> WardenResult<()> {
    let raw = tokio::time::timeout(
        limits.read_timeout,
        read_request(&mut stream, limits.max_request),
    )
    .await
    .map_err(|_| WardenError::Control("Request read timed out".into()))?
    .map_err(|e| WardenError::Control(format!("Failed to read request: {}", e)))?;

    if raw.iter().all(u8::is_ascii_whitespace) {
        debug!("Empty control request, closing connection");
        return Ok(());
    }

    let response = respond(supervisor, &raw).await;
    let payload = serde_json::to_vec(&response)
        .map_err(|e| WardenError::Serialization(format!("Failed to encode response: {}", e)))?;

    if payload.len() > limits.max_response {
        warn!(
            "Control response is {} bytes, above the {} byte client limit",
            payload.len(),
            limits.max_response
        );
    }

    stream
        .write_all(&payload)
        .await
        .map_err(|e| WardenError::Control(format!("Failed to write response: {}", e)))?;
    let _ = stream.shutdown().await;
    Ok(())
}

/// Reads until the bytes form a complete JSON value, the peer closes its
/// write half, or `limit` bytes have arrived.
async fn read_request(stream: &mut UnixStream, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(limit.min(4096));
    let mut chunk = [0u8; 512];

    while buf.len() < limit {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let take = n.min(limit - buf.len());
        buf.extend_from_slice(&chunk[..take]);

        if serde_json::from_slice::<serde_json::Value>(&buf).is_ok() {
            break;
        }
    }

    Ok(buf)
}

/// Decodes one raw request and runs it against the supervisor.
pub(crate) async fn respond(supervisor: &Supervisor, raw: &[u8]) -> CommandResponse {
    let request: CommandRequest = match serde_json::from_slice(raw) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting malformed control request: {}", e);
            return CommandResponse::failure("Invalid JSON");
        }
    };

    match request.parse() {
        Ok(command) => supervisor.handle_command(command).await,
        Err(e) => {
            warn!("{}", e);
            CommandResponse::failure(e.to_string())
        }
    }
}
