//! UDP discovery/rotation control listener.
//!
//! One socket, one recv→dispatch step per poll. Two datagram shapes:
//! a literal discovery token answered on the fixed adjacent port, and a
//! free-form "pitch yaw roll" float triple whose last value drives the
//! model rotation. No framing, versioning or authentication.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use anyhow::{Context, Result};

/// Default port the viewer listens on.
pub const CONTROL_PORT: u16 = 4000;
/// Largest datagram accepted.
pub const RECV_BUFFER_SIZE: usize = 2048;
/// Controllers announce themselves with this exact payload.
pub const DISCOVERY_TOKEN: &[u8] = b"GHOST-CONTROLLER";
/// Acknowledgment sent back to a discovered controller.
pub const DISCOVERY_REPLY: &[u8] = b"SERVER ACTIVE";

/// One decoded control datagram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlEvent {
    /// A controller announced itself; the acknowledgment was already sent.
    Discovery(SocketAddr),
    /// Orientation update. The roll component is what the renderer
    /// consumes as its rotation value.
    Orientation { pitch: f32, yaw: f32, roll: f32 },
}

/// Nonblocking UDP listener for control traffic.
pub struct ControlServer {
    socket: UdpSocket,
    recv_buf: [u8; RECV_BUFFER_SIZE],
    reply_port: u16,
}

impl ControlServer {
    /// Bind the control socket. Acknowledgments go to the port adjacent
    /// to the bound one.
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Debug) -> Result<Self> {
        let socket =
            UdpSocket::bind(&addr).with_context(|| format!("failed to bind control socket {addr:?}"))?;
        socket
            .set_nonblocking(true)
            .context("failed to set control socket nonblocking")?;
        let local = socket.local_addr().context("control socket has no local addr")?;
        log::info!("control listening on {local}");
        Ok(Self {
            socket,
            recv_buf: [0u8; RECV_BUFFER_SIZE],
            reply_port: local.port().wrapping_add(1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().context("control socket has no local addr")
    }

    /// Receive and dispatch at most one datagram. Returns `None` when
    /// nothing is pending or the datagram was malformed (malformed traffic
    /// is logged and dropped, never partially applied).
    pub fn poll(&mut self) -> Option<ControlEvent> {
        let (len, from) = match self.socket.recv_from(&mut self.recv_buf) {
            Ok(received) => received,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return None,
            Err(e) => {
                // A controller that never listens on the reply port can
                // surface ICMP port-unreachable here as a recv error
                // (ConnectionReset on some platforms). Dropped like
                // malformed traffic; the listener keeps serving.
                log::warn!("control recv error ignored: {e}");
                return None;
            }
        };
        log::debug!("control datagram: {len} bytes from {from}");

        let payload = &self.recv_buf[..len];
        if payload == DISCOVERY_TOKEN {
            let reply_to = SocketAddr::new(from.ip(), self.reply_port);
            log::info!("controller discovered at {from}, replying to {reply_to}");
            if let Err(e) = self.socket.send_to(DISCOVERY_REPLY, reply_to) {
                log::warn!("failed to acknowledge controller {reply_to}: {e}");
            }
            return Some(ControlEvent::Discovery(from));
        }

        match parse_orientation(payload) {
            Some([pitch, yaw, roll]) => Some(ControlEvent::Orientation { pitch, yaw, roll }),
            None => {
                log::warn!("dropping malformed control datagram from {from}");
                None
            }
        }
    }
}

/// Parses "pitch yaw roll" as three whitespace-separated floats. All
/// three must be present and numeric; trailing text is ignored.
pub fn parse_orientation(payload: &[u8]) -> Option<[f32; 3]> {
    let text = std::str::from_utf8(payload).ok()?;
    let mut tokens = text.split_whitespace();
    let mut out = [0f32; 3];
    for slot in &mut out {
        *slot = tokens.next()?.parse::<f32>().ok()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parses_three_floats() {
        assert_eq!(parse_orientation(b"1.5 -2 90.0"), Some([1.5, -2.0, 90.0]));
        assert_eq!(parse_orientation(b" 0 0 45 trailing"), Some([0.0, 0.0, 45.0]));
    }

    #[test]
    fn rejects_partial_or_garbage_payloads() {
        assert_eq!(parse_orientation(b"1.0 2.0"), None);
        assert_eq!(parse_orientation(b"a b c"), None);
        assert_eq!(parse_orientation(b""), None);
        assert_eq!(parse_orientation(&[0xFF, 0xFE, 0x20]), None);
    }

    #[test]
    fn orientation_datagram_reaches_poll() {
        let mut server = ControlServer::bind("127.0.0.1:0").expect("bind server");
        let server_addr = server.local_addr().expect("local addr");

        let client = UdpSocket::bind("127.0.0.1:0").expect("bind client");
        client.send_to(b"10 20 30", server_addr).expect("send");

        let event = poll_until_event(&mut server);
        assert_eq!(
            event,
            ControlEvent::Orientation {
                pitch: 10.0,
                yaw: 20.0,
                roll: 30.0,
            }
        );
    }

    #[test]
    fn discovery_token_is_acknowledged_on_adjacent_port() {
        let (mut server, ack_listener) = bind_with_ack_listener();
        let server_addr = server.local_addr().expect("local addr");

        let client = UdpSocket::bind("127.0.0.1:0").expect("bind client");
        client.send_to(DISCOVERY_TOKEN, server_addr).expect("send");

        match poll_until_event(&mut server) {
            ControlEvent::Discovery(addr) => assert_eq!(addr.port(), client.local_addr().unwrap().port()),
            other => panic!("expected Discovery, got {other:?}"),
        }

        // The reply leg: the adjacent port receives exactly the
        // acknowledgment payload.
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let (len, _) = ack_listener.recv_from(&mut buf).expect("acknowledgment");
        assert_eq!(&buf[..len], DISCOVERY_REPLY);
    }

    #[test]
    fn discovery_without_ack_listener_keeps_the_listener_alive() {
        let mut server = ControlServer::bind("127.0.0.1:0").expect("bind server");
        let server_addr = server.local_addr().expect("local addr");

        // Nobody listens on the adjacent port; the acknowledgment goes
        // nowhere and any resulting socket error must not end polling.
        let client = UdpSocket::bind("127.0.0.1:0").expect("bind client");
        client.send_to(DISCOVERY_TOKEN, server_addr).expect("send");
        assert!(matches!(
            poll_until_event(&mut server),
            ControlEvent::Discovery(_)
        ));

        client.send_to(b"0 0 15", server_addr).expect("send");
        assert_eq!(
            poll_until_event(&mut server),
            ControlEvent::Orientation {
                pitch: 0.0,
                yaw: 0.0,
                roll: 15.0,
            }
        );
    }

    #[test]
    fn malformed_datagram_is_dropped() {
        let mut server = ControlServer::bind("127.0.0.1:0").expect("bind server");
        let server_addr = server.local_addr().expect("local addr");

        let client = UdpSocket::bind("127.0.0.1:0").expect("bind client");
        client.send_to(b"not floats", server_addr).expect("send");
        client.send_to(b"1 2 3", server_addr).expect("send");

        // The garbage datagram yields no event; the next poll still sees
        // the valid one.
        let event = poll_until_event(&mut server);
        assert_eq!(
            event,
            ControlEvent::Orientation {
                pitch: 1.0,
                yaw: 2.0,
                roll: 3.0,
            }
        );
    }

    fn poll_until_event(server: &mut ControlServer) -> ControlEvent {
        for _ in 0..200 {
            if let Some(event) = server.poll() {
                return event;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("no control event arrived");
    }

    /// Binds a server whose adjacent port is free, plus a listener on
    /// that port for the acknowledgment leg.
    fn bind_with_ack_listener() -> (ControlServer, UdpSocket) {
        for _ in 0..16 {
            let server = ControlServer::bind("127.0.0.1:0").expect("bind server");
            let port = server.local_addr().expect("local addr").port();
            if let Ok(ack) = UdpSocket::bind(("127.0.0.1", port.wrapping_add(1))) {
                ack.set_read_timeout(Some(Duration::from_secs(2)))
                    .expect("set timeout");
                return (server, ack);
            }
        }
        panic!("no server with a free adjacent port");
    }
}
