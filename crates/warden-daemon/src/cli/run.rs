use super::utils::print_banner;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinError;
use tracing::info;
use warden_daemon::{CancellationToken, Supervisor, SupervisorConfig};
use warden_types::{WardenError, WardenResult};

pub async fn run_supervisor(config: SupervisorConfig, systemd: bool) -> WardenResult<()> {
    print_banner();
    info!("Starting Warden supervisor v{}", env!("CARGO_PKG_VERSION"));
    info!("Control directory: {:?}", config.paths.control_dir);
    info!("Server binary: {:?}", config.paths.binary());

    config.log_warnings();

    let supervisor = Arc::new(Supervisor::new(config)?);
    let (trigger, token) = CancellationToken::new();
    let mut runner = tokio::spawn(Arc::clone(&supervisor).run(token));

    if systemd {
        notify_systemd_ready();
    }

    tokio::select! {
        finished = &mut runner => {
            return flatten(finished);
        }
        received = wait_for_shutdown() => {
            received?;
        }
    }

    info!("Shutting down...");
    trigger.trigger();
    flatten(runner.await)?;

    info!("Shutdown complete");
    Ok(())
}

fn flatten(result: Result<WardenResult<()>, JoinError>) -> WardenResult<()> {
    result.map_err(|e| WardenError::Internal(format!("Supervisor task failed: {}", e)))?
}

async fn wait_for_shutdown() -> WardenResult<()> {
    let install = |kind: SignalKind, name: &str| {
        signal(kind).map_err(|e| {
            WardenError::Internal(format!("Failed to install {} handler: {}", name, e))
        })
    };
    let mut sigterm = install(SignalKind::terminate(), "SIGTERM")?;
    let mut sigint = install(SignalKind::interrupt(), "SIGINT")?;
    let mut sighup = install(SignalKind::hangup(), "SIGHUP")?;

    tokio::select! {
        _ = sigterm.recv() => { info!("Received SIGTERM"); }
        _ = sigint.recv() => { info!("Received SIGINT"); }
        _ = sighup.recv() => { info!("Received SIGHUP"); }
    }

    Ok(())
}

fn notify_systemd_ready() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(socket_path) = std::env::var("NOTIFY_SOCKET") {
            use std::os::unix::net::UnixDatagram;
            if let Ok(socket) = UnixDatagram::unbound() {
                let _ = socket.send_to(b"READY=1", &socket_path);
                tracing::debug!("Notified systemd: READY=1");
            }
        }
    }
}
