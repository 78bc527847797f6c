use crate::event::ServerEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked for a connection without starting a task.
    ConnectRequested,
    /// Caller tore the connection down.
    DisconnectRequested,
    /// Caller submitted a research query.
    StartRequested { query: String },
    /// Caller asked the remote to stop the running task.
    StopRequested,
    /// The verification widget produced a fresh token.
    TokenProvided { token: String },
    /// The transport reported the socket open.
    TransportOpened,
    /// The transport reported the socket closed.
    TransportClosed,
    /// The transport reported a connect or mid-stream failure. A
    /// `TransportClosed` always follows.
    TransportFailed { message: String },
    /// A decoded server-pushed event arrived.
    Server(ServerEvent),
    /// The connect deadline elapsed while a start was still parked.
    ConnectDeadlineElapsed,
    /// Fallback for placeholder wiring.
    NoOp,
}
