//! Local control plane: a Unix stream socket carrying one JSON command and
//! one JSON response per connection.

mod client;
mod listener;

#[cfg(test)]
mod tests;

pub use client::SupervisorClient;
pub use listener::ControlListener;
