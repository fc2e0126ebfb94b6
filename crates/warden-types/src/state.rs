use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
    Crashed,
    Disabled,
    Maintenance,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerState::Stopped => "stopped",
            ServerState::Starting => "starting",
            ServerState::Running => "running",
            ServerState::Stopping => "stopping",
            ServerState::Crashed => "crashed",
            ServerState::Disabled => "disabled",
            ServerState::Maintenance => "maintenance",
        }
    }

    /// States in which a subordinate process may legitimately be tracked.
    pub fn has_process(&self) -> bool {
        matches!(
            self,
            ServerState::Starting | ServerState::Running | ServerState::Stopping
        )
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record published to external observers, both over the control socket and
/// through the state artifact on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupervisorState {
    pub state: ServerState,
    pub pid: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub uptime_seconds: u64,
    pub restart_count: u64,
    pub last_exit_code: Option<i32>,
    pub last_crash_time: Option<DateTime<Utc>>,
    pub auto_restart: bool,
    pub maintenance: bool,
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for SupervisorState {
    fn default() -> Self {
        Self {
            state: ServerState::Stopped,
            pid: None,
            started_at: None,
            uptime_seconds: 0,
            restart_count: 0,
            last_exit_code: None,
            last_crash_time: None,
            auto_restart: true,
            maintenance: false,
            message: String::new(),
            updated_at: Utc::now(),
        }
    }
}

impl SupervisorState {
    /// Recomputes derived fields as of `now`.
    ///
    /// Uptime only accrues while running; outside the transitional states the
    /// start timestamp is dropped as well.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        match (self.state, self.started_at) {
            (ServerState::Running, Some(started)) => {
                self.uptime_seconds = (now - started).num_seconds().max(0) as u64;
            }
            _ => {
                self.uptime_seconds = 0;
                if !self.state.has_process() {
                    self.started_at = None;
                }
            }
        }
        self.updated_at = now;
    }

    /// Copy with derived fields brought up to date.
    pub fn snapshot(&self) -> Self {
        let mut snapshot = self.clone();
        snapshot.refresh(Utc::now());
        snapshot
    }

    pub fn is_running(&self) -> bool {
        self.state == ServerState::Running
    }

    /// Clears everything tied to a process that is no longer tracked.
    pub fn clear_process(&mut self) {
        self.pid = None;
        self.started_at = None;
        self.uptime_seconds = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&ServerState::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
        let parsed: ServerState = serde_json::from_str("\"crashed\"").unwrap();
        assert_eq!(parsed, ServerState::Crashed);
    }

    #[test]
    fn test_refresh_running_computes_uptime() {
        let now = Utc::now();
        let mut state = SupervisorState {
            state: ServerState::Running,
            pid: Some(42),
            started_at: Some(now - Duration::seconds(90)),
            ..Default::default()
        };
        state.refresh(now);
        assert_eq!(state.uptime_seconds, 90);
        assert_eq!(state.updated_at, now);
    }

    #[test]
    fn test_refresh_clears_uptime_when_not_running() {
        let now = Utc::now();
        for s in [
            ServerState::Stopped,
            ServerState::Crashed,
            ServerState::Disabled,
            ServerState::Maintenance,
        ] {
            let mut state = SupervisorState {
                state: s,
                started_at: Some(now - Duration::seconds(30)),
                uptime_seconds: 30,
                ..Default::default()
            };
            state.refresh(now);
            assert_eq!(state.uptime_seconds, 0, "state {}", s);
            assert!(state.started_at.is_none(), "state {}", s);
        }
    }

    #[test]
    fn test_refresh_keeps_start_time_while_stopping() {
        let now = Utc::now();
        let started = now - Duration::seconds(10);
        let mut state = SupervisorState {
            state: ServerState::Stopping,
            started_at: Some(started),
            ..Default::default()
        };
        state.refresh(now);
        assert_eq!(state.uptime_seconds, 0);
        assert_eq!(state.started_at, Some(started));
    }

    #[test]
    fn test_state_json_field_names() {
        let state = SupervisorState::default();
        let value: serde_json::Value = serde_json::to_value(&state).unwrap();
        for key in [
            "state",
            "pid",
            "started_at",
            "uptime_seconds",
            "restart_count",
            "last_exit_code",
            "last_crash_time",
            "auto_restart",
            "maintenance",
            "message",
            "updated_at",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["state"], "stopped");
        assert!(value["pid"].is_null());
    }
}
