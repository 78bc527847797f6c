//! Session controller facade: composes the pure core, the WebSocket
//! transport, and the verification gate into one embeddable handle.

mod config;
mod controller;
mod link;
mod verification;

pub mod logging;

pub use config::ClientConfig;
pub use controller::SessionController;
pub use link::{Connector, Link, WsConnector};
pub use verification::VerificationGate;
