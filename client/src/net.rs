//! Network channel: a tokio task owning the socket, bridged to the frame
//! loop through unbounded channels
//!
//! The frame loop never blocks on the wire. Inbound frames queue up and
//! are drained with `poll` at the top of a tick, which keeps message
//! effects atomic with respect to rendering and preserves delivery order.

use log::{error, info, warn};
use shared::ClientMessage;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug)]
pub enum ChannelEvent {
    /// One raw inbound frame, exactly as received.
    Frame(String),
    /// The socket failed or the channel task ended; no more frames will
    /// arrive.
    Closed,
}

/// The frame loop's handle to the network thread.
pub struct ChannelHandle {
    inbound: UnboundedReceiver<ChannelEvent>,
    outbound: UnboundedSender<ClientMessage>,
}

impl ChannelHandle {
    pub fn outbound(&self) -> UnboundedSender<ClientMessage> {
        self.outbound.clone()
    }

    /// Non-blocking: returns the next queued event, if any.
    pub fn poll(&mut self) -> Option<ChannelEvent> {
        self.inbound.try_recv().ok()
    }
}

/// Opens a duplex JSON-datagram channel to the server. The socket lives on
/// its own thread with a single-threaded tokio runtime; failure after
/// startup surfaces as a `Closed` event rather than an error here.
pub fn connect(server: &str) -> Result<ChannelHandle, Box<dyn std::error::Error>> {
    let addr: SocketAddr = server.parse()?;
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("net-channel".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start network runtime: {}", e);
                    let _ = inbound_tx.send(ChannelEvent::Closed);
                    return;
                }
            };
            runtime.block_on(run_channel(addr, inbound_tx, outbound_rx));
        })?;

    Ok(ChannelHandle {
        inbound: inbound_rx,
        outbound: outbound_tx,
    })
}

async fn run_channel(
    addr: SocketAddr,
    inbound: UnboundedSender<ChannelEvent>,
    mut outbound: UnboundedReceiver<ClientMessage>,
) {
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(socket) => socket,
        Err(e) => {
            error!("Failed to bind channel socket: {}", e);
            let _ = inbound.send(ChannelEvent::Closed);
            return;
        }
    };
    info!("Channel open to {}", addr);

    let mut buffer = [0u8; 4096];
    loop {
        tokio::select! {
            result = socket.recv_from(&mut buffer) => {
                match result {
                    Ok((len, _)) => match std::str::from_utf8(&buffer[..len]) {
                        Ok(raw) => {
                            if inbound.send(ChannelEvent::Frame(raw.to_string())).is_err() {
                                // frame loop is gone
                                break;
                            }
                        }
                        Err(_) => warn!("Dropping non-UTF8 datagram from {}", addr),
                    },
                    Err(e) => {
                        error!("Channel receive failed: {}", e);
                        let _ = inbound.send(ChannelEvent::Closed);
                        break;
                    }
                }
            },
            msg = outbound.recv() => {
                match msg {
                    Some(msg) => match serde_json::to_string(&msg) {
                        Ok(json) => {
                            if let Err(e) = socket.send_to(json.as_bytes(), addr).await {
                                error!("Channel send failed: {}", e);
                                let _ = inbound.send(ChannelEvent::Closed);
                                break;
                            }
                        }
                        Err(e) => error!("Failed to encode intent: {}", e),
                    },
                    // the session dropped its sender; shut the channel down
                    None => break,
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket as StdUdpSocket;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_channel_roundtrip_against_echo_server() {
        let server = StdUdpSocket::bind("127.0.0.1:0").expect("bind echo socket");
        let server_addr = server.local_addr().unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();

        let echo = thread::spawn(move || {
            let mut buf = [0u8; 4096];
            let (len, client_addr) = server.recv_from(&mut buf).expect("receive join");
            let raw = std::str::from_utf8(&buf[..len]).unwrap().to_string();
            let reply = r#"{"type":"welcome","id":"p1","x":1.0,"y":2.0}"#;
            server.send_to(reply.as_bytes(), client_addr).unwrap();
            raw
        });

        let mut handle = connect(&server_addr.to_string()).expect("connect");
        handle
            .outbound()
            .send(ClientMessage::Join {
                name: "Hero".to_string(),
            })
            .unwrap();

        let sent = echo.join().unwrap();
        assert!(sent.contains(r#""type":"join""#));
        assert!(sent.contains("Hero"));

        let mut frame = None;
        for _ in 0..200 {
            match handle.poll() {
                Some(ChannelEvent::Frame(raw)) => {
                    frame = Some(raw);
                    break;
                }
                Some(ChannelEvent::Closed) => panic!("channel closed unexpectedly"),
                None => thread::sleep(Duration::from_millis(5)),
            }
        }
        let frame = frame.expect("welcome frame arrives");
        assert!(frame.contains(r#""type":"welcome""#));
    }

    #[test]
    fn test_connect_rejects_unparseable_address() {
        assert!(connect("not-an-address").is_err());
    }
}
