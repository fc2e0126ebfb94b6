use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WardenError;
use crate::state::SupervisorState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    Maintenance,
    Resume,
    Status,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::Start,
        Command::Stop,
        Command::Restart,
        Command::Enable,
        Command::Disable,
        Command::Maintenance,
        Command::Resume,
        Command::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Restart => "restart",
            Command::Enable => "enable",
            Command::Disable => "disable",
            Command::Maintenance => "maintenance",
            Command::Resume => "resume",
            Command::Status => "status",
        }
    }

    /// Whether the command drives the subordinate process or the maintenance
    /// marker rather than only touching policy flags.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Command::Start
                | Command::Stop
                | Command::Restart
                | Command::Maintenance
                | Command::Resume
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| WardenError::UnknownCommand(s.to_string()))
    }
}

/// Wire request. The tag stays a raw string so unknown commands can be echoed
/// back to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: String,
}

impl CommandRequest {
    pub fn new(command: Command) -> Self {
        Self {
            command: command.as_str().to_string(),
        }
    }

    pub fn parse(&self) -> Result<Command, WardenError> {
        self.command.parse()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub state: Option<SupervisorState>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>, state: SupervisorState) -> Self {
        Self {
            success: true,
            message: message.into(),
            state: Some(state),
        }
    }

    pub fn with_outcome(success: bool, message: impl Into<String>, state: SupervisorState) -> Self {
        Self {
            success,
            message: message.into(),
            state: Some(state),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            state: None,
        }
    }

    pub fn failure_with_state(message: impl Into<String>, state: SupervisorState) -> Self {
        Self {
            success: false,
            message: message.into(),
            state: Some(state),
        }
    }
}
