use super::*;
use crate::config::SupervisorConfig;
use crate::supervisor::{CancellationToken, ShutdownTrigger, Supervisor};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use warden_types::{Command, ServerState};

struct Harness {
    _dir: tempfile::TempDir,
    config: SupervisorConfig,
    trigger: ShutdownTrigger,
    handle: JoinHandle<()>,
}

impl Harness {
    fn client(&self) -> SupervisorClient {
        SupervisorClient::from_config(&self.config)
    }

    async fn shutdown(self) {
        self.trigger.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("listener did not stop")
            .unwrap();
    }
}

fn serve() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SupervisorConfig::for_control_dir(dir.path().join("control"));
    config.paths.server_files = dir.path().join("server");

    let supervisor = Arc::new(Supervisor::new(config.clone()).unwrap());
    let listener = ControlListener::bind(&config).unwrap();
    let (trigger, token) = CancellationToken::new();
    let handle = tokio::spawn(listener.serve(supervisor, token));

    Harness {
        _dir: dir,
        config,
        trigger,
        handle,
    }
}

#[tokio::test]
async fn test_status_roundtrip() {
    let harness = serve();

    let response = harness.client().send(Command::Status).await;
    assert!(response.success);
    assert_eq!(response.message, "Status retrieved");
    assert_eq!(response.state.unwrap().state, ServerState::Stopped);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_unknown_command_is_rejected() {
    let harness = serve();

    let response = harness.client().send_raw(r#"{"command": "teleport"}"#).await;
    assert!(!response.success);
    assert_eq!(response.message, "Unknown command: teleport");
    assert!(response.state.is_none());

    harness.shutdown().await;
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let harness = serve();

    let response = harness.client().send_raw("start please").await;
    assert!(!response.success);
    assert_eq!(response.message, "Invalid JSON");
    assert!(response.state.is_none());

    let still_serving = harness.client().send(Command::Status).await;
    assert!(still_serving.success);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_command_tag_is_case_insensitive() {
    let harness = serve();

    let response = harness.client().send_raw(r#"{"command": "  DISABLE "}"#).await;
    assert!(response.success, "{}", response.message);
    assert_eq!(response.message, "Auto-restart disabled");
    assert!(!response.state.unwrap().auto_restart);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_empty_request_closes_silently() {
    let harness = serve();

    let mut stream = UnixStream::connect(harness.config.paths.socket()).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    assert!(raw.is_empty());

    harness.shutdown().await;
}

#[tokio::test]
async fn test_request_without_half_close() {
    let harness = serve();

    let mut stream = UnixStream::connect(harness.config.paths.socket()).await.unwrap();
    stream.write_all(br#"{"command":"status"}"#).await.unwrap();
    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), stream.read_to_end(&mut raw))
        .await
        .expect("response not sent before close")
        .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["state"]["state"], "stopped");

    harness.shutdown().await;
}

#[tokio::test]
async fn test_socket_permissions_and_cleanup() {
    use std::os::unix::fs::PermissionsExt;

    let harness = serve();
    let socket = harness.config.paths.socket();

    let mode = std::fs::metadata(&socket).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o666);

    harness.shutdown().await;
    assert!(!socket.exists());
}

#[tokio::test]
async fn test_bind_replaces_stale_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config = SupervisorConfig::for_control_dir(dir.path());
    std::fs::write(config.paths.socket(), "stale").unwrap();

    let listener = ControlListener::bind(&config).unwrap();
    assert_eq!(listener.path(), config.paths.socket());
}

#[tokio::test]
async fn test_client_without_supervisor() {
    let dir = tempfile::tempdir().unwrap();
    let client = SupervisorClient::new(dir.path().join("supervisor.sock"));

    let response = client.send(Command::Status).await;
    assert!(!response.success);
    assert_eq!(response.message, "Supervisor not running (socket not found)");
}

#[tokio::test]
async fn test_client_rejects_garbage_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.sock");
    let listener = tokio::net::UnixListener::bind(&path).unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 64];
        let _ = stream.read(&mut buf).await;
        stream.write_all(b"<html>").await.unwrap();
    });

    let response = SupervisorClient::new(&path).send(Command::Status).await;
    assert!(!response.success);
    assert!(response.message.starts_with("Invalid response from supervisor"));
}

#[tokio::test]
async fn test_client_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silent.sock");
    let listener = tokio::net::UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(stream);
    });

    let response = SupervisorClient::new(&path)
        .with_timeout(Duration::from_millis(200))
        .send(Command::Status)
        .await;
    assert!(!response.success);
    assert_eq!(response.message, "Supervisor request timed out");
    server.abort();
}
