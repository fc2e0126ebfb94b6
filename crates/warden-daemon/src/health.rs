//! Container health checks run against the files the supervisor publishes.
//! They never talk to the control socket, so they keep working while the
//! supervisor is busy with a slow stop.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use warden_types::ServerState;

use crate::config::PathsConfig;
use crate::supervisor::{read_state, state_age};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckResult {
    Pass(String),
    Warn(String),
    Fail(String),
}

impl CheckResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckResult::Pass(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CheckResult::Fail(_))
    }

    pub fn message(&self) -> &str {
        match self {
            CheckResult::Pass(m) | CheckResult::Warn(m) | CheckResult::Fail(m) => m,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticReport {
    checks: Vec<(String, CheckResult)>,
    timestamp: DateTime<Utc>,
}

impl Default for DiagnosticReport {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn add_check(&mut self, name: &str, result: CheckResult) {
        self.checks.push((name.to_string(), result));
    }

    pub fn checks(&self) -> &[(String, CheckResult)] {
        &self.checks
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|(_, r)| r.is_fail())
    }

    pub fn failures(&self) -> Vec<&(String, CheckResult)> {
        self.checks.iter().filter(|(_, r)| r.is_fail()).collect()
    }
}

pub fn run_health_checks(paths: &PathsConfig, max_age: Duration) -> DiagnosticReport {
    let mut report = DiagnosticReport::new();
    report.add_check("Supervisor", check_supervisor(&paths.pid_file()));
    report.add_check("State freshness", check_state_freshness(&paths.state_file(), max_age));
    report.add_check("Server state", check_server_state(&paths.state_file()));
    report
}

fn check_supervisor(pid_file: &Path) -> CheckResult {
    let contents = match std::fs::read_to_string(pid_file) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return CheckResult::Fail("Supervisor PID file missing".into())
        }
        Err(e) => return CheckResult::Fail(format!("Supervisor check failed: {}", e)),
    };

    match contents.trim().parse::<u32>() {
        Ok(pid) if process_alive(pid) => CheckResult::Pass(format!("Supervisor running (PID {})", pid)),
        Ok(pid) => CheckResult::Fail(format!("Supervisor PID {} not running", pid)),
        Err(e) => CheckResult::Fail(format!("Supervisor check failed: {}", e)),
    }
}

fn check_state_freshness(state_file: &Path, max_age: Duration) -> CheckResult {
    match state_age(state_file) {
        Ok(None) => CheckResult::Fail("State file missing".into()),
        Ok(Some(age)) if age > max_age => {
            CheckResult::Fail(format!("State file stale ({}s old)", age.as_secs()))
        }
        Ok(Some(age)) => CheckResult::Pass(format!("State file fresh ({}s old)", age.as_secs())),
        Err(e) => CheckResult::Fail(format!("State check failed: {}", e)),
    }
}

fn check_server_state(state_file: &Path) -> CheckResult {
    let state = match read_state(state_file) {
        Ok(Some(state)) => state,
        Ok(None) => return CheckResult::Fail("State parse failed: state file missing".into()),
        Err(e) => return CheckResult::Fail(format!("State parse failed: {}", e)),
    };

    if let (ServerState::Running, Some(pid)) = (state.state, state.pid) {
        if !process_alive(pid) {
            return CheckResult::Fail(format!(
                "Server PID {} not found but state is 'running'",
                pid
            ));
        }
    }

    if state.state == ServerState::Disabled {
        return CheckResult::Warn(format!("Server state: {} ({})", state.state, state.message));
    }

    CheckResult::Pass(format!("Server state: {}", state.state))
}

/// Signal-0 probe. A permission error still proves the pid exists.
pub fn process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}
