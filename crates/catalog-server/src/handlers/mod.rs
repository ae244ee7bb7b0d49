//! HTTP handler modules for the catalog API.
//!
//! Each sub-module implements thin handlers that parse requests, acquire the
//! catalog lock or talk to the hub, and return responses. No business logic
//! lives in handlers.

pub mod products;
pub mod socket;
