//! Real-time broadcast of text messages to every live connection.
//!
//! Provides the building blocks for the broadcast channel:
//! - [`connection::Connection`]: a delivery handle with an
//!   open/closing/closed lifecycle, created and owned by the transport
//! - [`broadcaster::BroadcastHub`]: a cloneable handle to the actor task
//!   that owns the registry and performs fan-out
//!
//! The hub knows nothing about products. The transport registers a
//! connection when a socket opens, forwards each inbound message to
//! [`BroadcastHub::broadcast`], and unregisters on close.

pub mod broadcaster;
pub mod connection;

pub use broadcaster::{BroadcastHub, HubConfig, HubError};
pub use connection::{Connection, ConnectionId, ConnectionState, DeliveryError};
