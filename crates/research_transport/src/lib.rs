//! Research transport: WebSocket connection management.
mod endpoint;
mod socket;
mod types;

pub use endpoint::{research_endpoint, EndpointError, RESEARCH_PATH};
pub use socket::WsHandle;
pub use types::TransportEvent;
