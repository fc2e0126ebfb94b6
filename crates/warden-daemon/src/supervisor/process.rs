use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tracing::debug;
use warden_types::{WardenError, WardenResult};

use crate::config::{PathsConfig, ServerConfig};
use crate::params::{ParamSource, ServerParams};

/// Builds and launches the subordinate server process.
///
/// Fragment files are read on every call so edits by collaborators apply to
/// the next start without restarting the supervisor.
#[derive(Clone, Debug)]
pub struct ProcessController {
    paths: PathsConfig,
    server: ServerConfig,
}

impl ProcessController {
    pub fn new(paths: PathsConfig, server: ServerConfig) -> Self {
        Self { paths, server }
    }

    pub fn binary(&self) -> PathBuf {
        self.paths.binary()
    }

    pub fn binary_exists(&self) -> bool {
        self.binary().exists()
    }

    pub fn working_dir(&self) -> &Path {
        &self.paths.server_files
    }

    /// Executable, client-mod fragment, server-mod fragment, then the general
    /// parameters split on whitespace. Mod flags must precede the rest.
    pub fn build_command(&self) -> Vec<String> {
        let mut cmd = vec![self.binary().display().to_string()];

        if let Some(mod_param) = read_fragment(&self.paths.mod_param_file()) {
            cmd.push(mod_param);
        }

        if let Some(server_mod_param) = read_fragment(&self.paths.server_mod_param_file()) {
            cmd.push(server_mod_param);
        }

        let (params, _) = self.resolve_params();
        cmd.extend(params.split_whitespace().map(str::to_string));
        cmd
    }

    pub fn resolve_params(&self) -> (String, ParamSource) {
        match read_fragment(&self.paths.server_params_file()) {
            Some(params) => (params, ParamSource::Override),
            None => (
                ServerParams::from_config(&self.paths, &self.server).to_command_string(),
                ParamSource::Default,
            ),
        }
    }

    /// Spawns with the server-files root as working directory and inherited
    /// standard streams.
    pub fn spawn(&self) -> WardenResult<Child> {
        let argv = self.build_command();
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| WardenError::Internal("Empty server command".into()))?;

        debug!("Launching {} with {} arguments", program, args.len());

        Command::new(program)
            .args(args)
            .current_dir(self.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| WardenError::Process(format!("{}", e)))
    }

    /// Asks the process to shut down.
    pub fn terminate(&self, pid: u32) -> WardenResult<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let raw = i32::try_from(pid)
            .map_err(|_| WardenError::Process(format!("PID {} out of range", pid)))?;
        kill(Pid::from_raw(raw), Signal::SIGTERM)
            .map_err(|e| WardenError::Process(format!("Failed to send SIGTERM to {}: {}", pid, e)))
    }
}

fn read_fragment(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Numeric exit code; a death by signal maps to the negated signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    status.signal().map(|signal| -signal).unwrap_or(-1)
}
