/// Lifecycle and payload notifications emitted by a transport link.
///
/// `Failed` reports a connect or mid-stream error; the link always emits a
/// trailing `Closed` afterwards, so consumers can drive every disconnect
/// transition from `Closed` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Failed(String),
    Closed,
}
