#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod command;
mod error;
mod state;

pub use command::{Command, CommandRequest, CommandResponse};
pub use error::{WardenError, WardenResult};
pub use state::{ServerState, SupervisorState};

pub const DEFAULT_CONTROL_DIR: &str = "/control";

pub const SOCKET_FILE_NAME: &str = "supervisor.sock";

pub const STATE_FILE_NAME: &str = "state.json";

pub const PID_FILE_NAME: &str = "supervisor.pid";

pub const MAINTENANCE_MARKER_NAME: &str = "maintenance";

pub const MAX_REQUEST_BYTES: usize = 1024;

pub const MAX_RESPONSE_BYTES: usize = 4096;
