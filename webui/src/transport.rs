//! The external message-transport collaborator.
//!
//! The real server (WebSocket framing, TLS, ...) lives outside this
//! crate; the dispatcher only needs the small surface below. Events
//! are buffered by the transport and drained on `poll`, so callbacks
//! reach the dispatcher only while the host drives `update()`.

use crate::error::TransportError;

/// Connection-lifecycle and message notifications, delivered in the
/// order they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Error(String),
    Interrupt,
    Ping(String),
    Message(String),
}

/// Bidirectional text-message transport.
pub trait Transport {
    /// Starts accepting connections on `port`.
    fn listen(&mut self, port: u16) -> Result<(), TransportError>;

    /// Drains every pending event. Never blocks.
    fn poll(&mut self) -> Vec<TransportEvent>;

    /// Sends one text message to the connected peers.
    fn write(&mut self, text: &str) -> Result<(), TransportError>;
}

/// In-memory transport backed by a pair of flume channels; the
/// stand-in used by tests and the loopback demo.
pub struct LoopbackTransport {
    inbound: flume::Receiver<TransportEvent>,
    outbound: flume::Sender<String>,
    port: Option<u16>,
}

/// Remote end of a [`LoopbackTransport`].
pub struct LoopbackPeer {
    inbound: flume::Sender<TransportEvent>,
    outbound: flume::Receiver<String>,
}

impl LoopbackTransport {
    /// Creates a connected transport/peer pair.
    pub fn pair() -> (Self, LoopbackPeer) {
        let (inbound_tx, inbound_rx) = flume::unbounded();
        let (outbound_tx, outbound_rx) = flume::unbounded();
        (
            Self {
                inbound: inbound_rx,
                outbound: outbound_tx,
                port: None,
            },
            LoopbackPeer {
                inbound: inbound_tx,
                outbound: outbound_rx,
            },
        )
    }
}

impl Transport for LoopbackTransport {
    fn listen(&mut self, port: u16) -> Result<(), TransportError> {
        self.port = Some(port);
        Ok(())
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        if self.port.is_none() {
            return Vec::new();
        }
        self.inbound.try_iter().collect()
    }

    fn write(&mut self, text: &str) -> Result<(), TransportError> {
        if self.port.is_none() {
            return Err(TransportError::NotListening);
        }
        self.outbound
            .send(text.to_string())
            .map_err(|_| TransportError::Closed)
    }
}

impl LoopbackPeer {
    pub fn connect(&self) {
        let _ = self.inbound.send(TransportEvent::Connected);
    }

    pub fn disconnect(&self) {
        let _ = self.inbound.send(TransportEvent::Disconnected);
    }

    pub fn interrupt(&self) {
        let _ = self.inbound.send(TransportEvent::Interrupt);
    }

    pub fn ping(&self, text: impl Into<String>) {
        let _ = self.inbound.send(TransportEvent::Ping(text.into()));
    }

    pub fn error(&self, text: impl Into<String>) {
        let _ = self.inbound.send(TransportEvent::Error(text.into()));
    }

    /// Queues a text message for the next `poll`.
    pub fn send(&self, text: impl Into<String>) {
        let _ = self.inbound.send(TransportEvent::Message(text.into()));
    }

    /// Takes every message the dispatcher has written so far.
    pub fn drain(&self) -> Vec<String> {
        self.outbound.try_iter().collect()
    }
}
