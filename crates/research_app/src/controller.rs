use std::time::Instant;

use client_logging::{client_debug, client_info, client_warn};
use research_core::{
    decode_event, update, ClientCommand, Effect, Msg, SessionSnapshot, SessionState,
};
use research_transport::TransportEvent;

use crate::link::{Connector, Link, WsConnector};
use crate::verification::VerificationGate;
use crate::ClientConfig;

/// Owns one research session end to end: the transport link, the pure
/// session state, the verification gate and the connect deadline slot.
///
/// All methods are called from one logical thread. Transport events are
/// folded in by [`SessionController::pump`], which the embedder calls on
/// its tick.
pub struct SessionController {
    config: ClientConfig,
    connector: Box<dyn Connector>,
    link: Option<Box<dyn Link>>,
    state: SessionState,
    gate: VerificationGate,
    connect_deadline: Option<Instant>,
    on_refresh: Option<Box<dyn FnMut()>>,
}

impl SessionController {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let connector = WsConnector::new(&config.origin)?;
        client_info!("research endpoint: {}", connector.endpoint());
        Ok(Self::with_connector(config, Box::new(connector)))
    }

    /// Builds a controller over an arbitrary connector. Tests use this to
    /// substitute a scripted link.
    pub fn with_connector(config: ClientConfig, connector: Box<dyn Connector>) -> Self {
        let gate = VerificationGate::new(config.use_turnstile);
        Self {
            config,
            connector,
            link: None,
            state: SessionState::new(),
            gate,
            connect_deadline: None,
            on_refresh: None,
        }
    }

    /// Registers the callback invoked when the verification token must be
    /// refreshed. Delivered from `pump`, never from a disconnect handler.
    pub fn on_verification_refresh(&mut self, callback: impl FnMut() + 'static) {
        self.on_refresh = Some(Box::new(callback));
    }

    pub fn connect(&mut self) {
        self.dispatch(Msg::ConnectRequested);
    }

    pub fn disconnect(&mut self) {
        self.dispatch(Msg::DisconnectRequested);
    }

    pub fn start_research(&mut self, query: impl Into<String>) {
        self.dispatch(Msg::StartRequested {
            query: query.into(),
        });
    }

    pub fn stop_research(&mut self) {
        self.dispatch(Msg::StopRequested);
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.gate.set_token(token.clone());
        self.dispatch(Msg::TokenProvided { token });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// One tick: delivers any deferred verification refresh, drains the
    /// transport, fires the connect deadline. Returns whether the snapshot
    /// changed since the previous pump.
    pub fn pump(&mut self) -> bool {
        if self.gate.take_refresh_request() {
            client_info!("requesting verification token refresh");
            if let Some(callback) = self.on_refresh.as_mut() {
                callback();
            }
        }

        loop {
            let event = match self.link.as_ref() {
                Some(link) => link.try_recv(),
                None => None,
            };
            let Some(event) = event else { break };
            let closed = event == TransportEvent::Closed;
            if let Some(msg) = self.msg_for_transport_event(event) {
                self.dispatch(msg);
            }
            if closed {
                self.link = None;
            }
        }

        if let Some(deadline) = self.connect_deadline {
            if Instant::now() >= deadline {
                self.connect_deadline = None;
                self.dispatch(Msg::ConnectDeadlineElapsed);
            }
        }

        self.state.consume_dirty()
    }

    fn msg_for_transport_event(&self, event: TransportEvent) -> Option<Msg> {
        match event {
            TransportEvent::Opened => Some(Msg::TransportOpened),
            TransportEvent::Closed => Some(Msg::TransportClosed),
            TransportEvent::Failed(message) => Some(Msg::TransportFailed { message }),
            TransportEvent::Message(raw) => match decode_event(&raw) {
                Ok(Some(event)) => Some(Msg::Server(event)),
                Ok(None) => {
                    client_debug!("ignoring unrecognized server message");
                    None
                }
                Err(err) => {
                    client_warn!("dropping undecodable server message: {err}");
                    None
                }
            },
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::OpenConnection => {
                self.link = Some(self.connector.open());
            }
            Effect::CloseConnection => {
                if let Some(link) = self.link.take() {
                    link.close();
                }
            }
            Effect::SendStart { query } => {
                let command = ClientCommand::Start {
                    query,
                    turnstile_token: self.gate.token_for_start(),
                };
                self.send(command);
            }
            Effect::SendStop => {
                self.send(ClientCommand::Stop);
            }
            Effect::ArmConnectDeadline => {
                self.connect_deadline = Some(Instant::now() + self.config.connect_timeout);
            }
            Effect::CancelConnectDeadline => {
                self.connect_deadline = None;
            }
            Effect::RefreshVerification => {
                self.gate.invalidate();
            }
        }
    }

    fn send(&mut self, command: ClientCommand) {
        match self.link.as_ref() {
            Some(link) => link.send_text(command.to_json()),
            None => client_warn!("dropping outbound command: no live connection"),
        }
    }
}
