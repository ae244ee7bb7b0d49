//! API schema types for request definitions.
//!
//! Types use serde derives for JSON deserialization and convert into the
//! validated catalog-core types at the request boundary.

pub mod products;
