//! Application state shared by every handler.
//!
//! [`AppState`] wraps the catalog in `Arc<tokio::sync::Mutex<>>` so handlers
//! await the lock without blocking the tokio runtime. Reads take the same
//! lock as writes: a read never observes a half-applied mutation, and two
//! concurrent creates cannot compute the same id.
//!
//! The broadcast hub needs no lock here; its handle is a channel sender to
//! the actor that owns the registry.

use std::sync::Arc;

use catalog_core::IdAllocation;
use catalog_storage::{InMemoryStore, JsonFileStore, ProductStore};

use crate::config::ServerConfig;
use crate::hub::{BroadcastHub, HubConfig};
use crate::service::ProductService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The record store (async Mutex -- non-blocking await).
    pub catalog: Arc<tokio::sync::Mutex<ProductService>>,
    /// Handle to the broadcast actor.
    pub hub: BroadcastHub,
}

impl AppState {
    /// Creates state backed by the JSON file named in `config`.
    ///
    /// Must be called inside a tokio runtime (spawns the hub actor).
    pub fn new(config: &ServerConfig) -> Self {
        let store = JsonFileStore::new(&config.data_path);
        Self::with_store(store, config.id_policy, config.hub)
    }

    /// Creates state around an arbitrary persistence backend.
    pub fn with_store<S>(store: S, policy: IdAllocation, hub: HubConfig) -> Self
    where
        S: ProductStore + 'static,
    {
        let service = ProductService::new(Box::new(store), policy);
        AppState {
            catalog: Arc::new(tokio::sync::Mutex::new(service)),
            hub: BroadcastHub::spawn(hub),
        }
    }

    /// Creates state with an empty in-memory store (for testing).
    pub fn in_memory() -> Self {
        Self::with_store(
            InMemoryStore::new(),
            IdAllocation::default(),
            HubConfig::default(),
        )
    }
}
