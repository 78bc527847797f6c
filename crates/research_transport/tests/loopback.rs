//! Link tests against an in-process WebSocket echo server.

use std::sync::mpsc;
use std::sync::Once;
use std::thread;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use research_transport::{research_endpoint, TransportEvent, WsHandle};
use tokio_tungstenite::tungstenite::Message as WsMessage;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        client_logging::initialize_for_tests();
    });
}

/// Drains the handle until an event arrives, failing after a few seconds.
fn next_event(handle: &WsHandle) -> TransportEvent {
    for _ in 0..500 {
        if let Some(event) = handle.try_recv() {
            return event;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("no transport event within five seconds");
}

/// Starts a one-connection echo server and reports its port.
fn spawn_echo_server(close_after_accept: bool) -> u16 {
    let (port_tx, port_rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            port_tx.send(port).unwrap();
            let (stream, _peer) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            if close_after_accept {
                let _ = ws.close(None).await;
                return;
            }
            while let Some(Ok(frame)) = ws.next().await {
                match frame {
                    WsMessage::Text(text) => {
                        if ws.send(WsMessage::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }
        });
    });
    port_rx.recv().unwrap()
}

#[test]
fn echoed_text_arrives_as_message_event() {
    init_logging();
    let port = spawn_echo_server(false);
    let url = research_endpoint(&format!("http://127.0.0.1:{port}")).unwrap();

    let handle = WsHandle::open(url);
    assert_eq!(next_event(&handle), TransportEvent::Opened);

    handle.send_text(r#"{"action":"start","query":"cats"}"#);
    assert_eq!(
        next_event(&handle),
        TransportEvent::Message(r#"{"action":"start","query":"cats"}"#.to_string())
    );

    handle.close();
    assert_eq!(next_event(&handle), TransportEvent::Closed);
}

#[test]
fn remote_close_yields_closed() {
    init_logging();
    let port = spawn_echo_server(true);
    let url = research_endpoint(&format!("http://127.0.0.1:{port}")).unwrap();

    let handle = WsHandle::open(url);
    assert_eq!(next_event(&handle), TransportEvent::Opened);
    assert_eq!(next_event(&handle), TransportEvent::Closed);
}

#[test]
fn connect_failure_reports_failed_then_closed() {
    init_logging();
    // Bind and drop a listener so the port is very likely unoccupied.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = research_endpoint(&format!("http://127.0.0.1:{port}")).unwrap();

    let handle = WsHandle::open(url);
    assert!(matches!(next_event(&handle), TransportEvent::Failed(_)));
    assert_eq!(next_event(&handle), TransportEvent::Closed);
}
