//! Delivery handles for live connections.
//!
//! A [`Connection`] pairs an id with the sending half of a bounded outbound
//! queue. The transport holds the receiving half and drains it into the
//! socket; the hub only ever pushes into the queue. Lifecycle is tracked in
//! a shared atomic so every clone of the handle observes state changes.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Unique connection identifier (UUID v4 newtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        ConnectionId(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ConnectionState {
    Open = 0,
    Closing = 1,
    Closed = 2,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnectionState::Open,
            1 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// Why a single delivery did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection is closing or closed.
    #[error("connection is not open")]
    NotOpen,
    /// The outbound queue is at capacity; the peer is not keeping up.
    #[error("outbound queue full")]
    QueueFull,
    /// The transport dropped its receiver.
    #[error("connection receiver dropped")]
    Disconnected,
}

/// Handle used to deliver messages to one live connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    outbound: mpsc::Sender<String>,
    state: Arc<AtomicU8>,
}

impl Connection {
    /// Opens a connection with an outbound queue of `capacity` messages.
    ///
    /// Returns the handle and the receiver the transport drains.
    pub fn open(capacity: usize) -> (Connection, mpsc::Receiver<String>) {
        let (outbound, receiver) = mpsc::channel(capacity.max(1));
        let connection = Connection {
            id: ConnectionId::new(),
            outbound,
            state: Arc::new(AtomicU8::new(ConnectionState::Open as u8)),
        };
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Marks the connection as closing. No effect once closed.
    pub fn begin_close(&self) {
        self.advance(ConnectionState::Closing);
    }

    /// Marks the connection as closed. Terminal.
    pub fn finish_close(&self) {
        self.advance(ConnectionState::Closed);
    }

    fn advance(&self, to: ConnectionState) {
        self.state.fetch_max(to as u8, Ordering::AcqRel);
    }

    /// Queues `payload` without waiting.
    pub fn try_deliver(&self, payload: String) -> Result<(), DeliveryError> {
        if !self.is_open() {
            return Err(DeliveryError::NotOpen);
        }
        self.outbound.try_send(payload).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }
}
