mod cancellation;
mod core;
mod handler;
mod lifecycle;
mod persist;
mod policy;
mod process;


pub use cancellation::{CancellationToken, ShutdownTrigger};
pub use core::Supervisor;
pub use persist::{read_state, state_age, StateStore};
pub use policy::{RestartDecision, RestartPolicy, RestartWindow};
pub use process::{exit_code, ProcessController};
