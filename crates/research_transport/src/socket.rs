use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;

use client_logging::{client_info, client_warn, set_connection_seq};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

use crate::TransportEvent;

static NEXT_CONNECTION_SEQ: AtomicU64 = AtomicU64::new(1);

enum LinkCommand {
    Send(String),
    Close,
}

/// Handle to one WebSocket link, owned by the session controller.
///
/// The link lives on a dedicated worker thread with its own tokio runtime
/// (one connection per handle, never reconnected); the controller observes
/// it by draining [`WsHandle::try_recv`] from its single logical thread.
pub struct WsHandle {
    cmd_tx: UnboundedSender<LinkCommand>,
    event_rx: mpsc::Receiver<TransportEvent>,
}

impl WsHandle {
    pub fn open(url: Url) -> Self {
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let seq = NEXT_CONNECTION_SEQ.fetch_add(1, Ordering::Relaxed);

        thread::spawn(move || {
            set_connection_seq(seq);
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            runtime.block_on(run_link(url, cmd_rx, event_tx));
        });

        Self { cmd_tx, event_rx }
    }

    /// Enqueues one outbound text frame. Safe after the link has died.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.cmd_tx.send(LinkCommand::Send(text.into()));
    }

    /// Requests a graceful close. Safe after the link has died.
    pub fn close(&self) {
        let _ = self.cmd_tx.send(LinkCommand::Close);
    }

    pub fn try_recv(&self) -> Option<TransportEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn run_link(
    url: Url,
    mut cmd_rx: UnboundedReceiver<LinkCommand>,
    event_tx: mpsc::Sender<TransportEvent>,
) {
    let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            client_warn!("websocket connect to {url} failed: {err}");
            let _ = event_tx.send(TransportEvent::Failed(err.to_string()));
            let _ = event_tx.send(TransportEvent::Closed);
            return;
        }
    };
    client_info!("websocket open: {url}");
    let _ = event_tx.send(TransportEvent::Opened);

    let (mut sink, mut reader) = stream.split();
    loop {
        tokio::select! {
            incoming = reader.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    let _ = event_tx.send(TransportEvent::Message(text));
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    client_info!("websocket closed by remote");
                    let _ = event_tx.send(TransportEvent::Closed);
                    return;
                }
                Some(Ok(_)) => {
                    // Binary, ping and pong frames carry no events.
                }
                Some(Err(err)) => {
                    client_warn!("websocket read error: {err}");
                    let _ = event_tx.send(TransportEvent::Failed(err.to_string()));
                    let _ = event_tx.send(TransportEvent::Closed);
                    return;
                }
            },
            command = cmd_rx.recv() => match command {
                Some(LinkCommand::Send(text)) => {
                    if let Err(err) = sink.send(WsMessage::Text(text)).await {
                        client_warn!("websocket send failed: {err}");
                        let _ = event_tx.send(TransportEvent::Failed(err.to_string()));
                        let _ = event_tx.send(TransportEvent::Closed);
                        return;
                    }
                }
                // A dropped handle closes the link too.
                Some(LinkCommand::Close) | None => {
                    let _ = sink.send(WsMessage::Close(None)).await;
                    let _ = event_tx.send(TransportEvent::Closed);
                    return;
                }
            },
        }
    }
}
