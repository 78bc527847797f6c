#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a transport link to the research endpoint.
    OpenConnection,
    /// Close and discard the current transport link.
    CloseConnection,
    /// Transmit `{"action":"start", ...}`. The shell attaches the
    /// verification token read synchronously at send time.
    SendStart { query: String },
    /// Transmit `{"action":"stop"}`.
    SendStop,
    /// Arm the single connect deadline for a parked start.
    ArmConnectDeadline,
    /// Cancel the connect deadline (the parked start was transmitted).
    CancelConnectDeadline,
    /// The token became invalid; ask the verification widget for a fresh
    /// one on the next tick.
    RefreshVerification,
}
