//! HTTP/JSON catalog server with a real-time broadcast channel.
//!
//! Serves a small product catalog through REST routes backed by a
//! file-persisted [`service::ProductService`], and relays WebSocket text
//! messages to every open connection through the [`hub::BroadcastHub`].
//! The two halves share nothing but the process.

pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
