//! droidmon: real-time performance monitor client for Android devices.
//!
//! The library holds the session core ([`controller::SessionController`] and
//! the pieces it owns) plus the backend and stream clients; the binary wraps it
//! in a terminal UI.

pub mod api;
pub mod chart;
pub mod controller;
pub mod error;
pub mod export;
pub mod history;
pub mod logging;
pub mod profiles;
pub mod sample;
pub mod session;
pub mod types;
pub mod ws;

pub use controller::{Command, SessionController};
pub use error::SessionError;
