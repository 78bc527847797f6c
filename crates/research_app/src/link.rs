use research_transport::{research_endpoint, EndpointError, TransportEvent, WsHandle};
use url::Url;

/// One live connection, as the controller sees it. The real transport
/// implements this with [`WsHandle`]; tests substitute scripted fakes.
pub trait Link {
    fn send_text(&self, text: String);
    fn close(&self);
    fn try_recv(&self) -> Option<TransportEvent>;
}

impl Link for WsHandle {
    fn send_text(&self, text: String) {
        WsHandle::send_text(self, text);
    }

    fn close(&self) {
        WsHandle::close(self);
    }

    fn try_recv(&self) -> Option<TransportEvent> {
        WsHandle::try_recv(self)
    }
}

/// Produces a fresh [`Link`] each time the controller opens a connection.
pub trait Connector {
    fn open(&mut self) -> Box<dyn Link>;
}

/// Connector backed by the real WebSocket transport. The endpoint is
/// derived once at construction so a bad origin fails up front.
pub struct WsConnector {
    endpoint: Url,
}

impl WsConnector {
    pub fn new(origin: &str) -> Result<Self, EndpointError> {
        Ok(Self {
            endpoint: research_endpoint(origin)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Connector for WsConnector {
    fn open(&mut self) -> Box<dyn Link> {
        Box::new(WsHandle::open(self.endpoint.clone()))
    }
}
