//! Persistence for the product catalog.
//!
//! Provides the [`ProductStore`] trait defining the whole-collection
//! persistence contract, plus the [`JsonFileStore`] and [`InMemoryStore`]
//! backends.
//!
//! # Contract
//!
//! The collection is always written as one unit: a store never receives a
//! delta, only the complete post-mutation sequence. Reads happen once at
//! startup and absorb failures into an empty collection (see
//! [`ProductStore::load`]).
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`traits`]: ProductStore trait definition
//! - [`json_file`]: JsonFileStore, the flat-file backend
//! - [`memory`]: InMemoryStore, for tests and ephemeral runs

pub mod error;
pub mod json_file;
pub mod memory;
pub mod traits;

pub use error::StorageError;
pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::ProductStore;
