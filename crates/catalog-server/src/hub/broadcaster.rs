//! The broadcast actor and its handle.
//!
//! One tokio task owns the [`Registry`] and processes [`HubCommand`]s one at
//! a time. Because a broadcast's whole fan-out happens inside a single
//! command, two broadcasts never interleave and every recipient observes the
//! same total order of messages.
//!
//! Fan-out never waits on a peer: each delivery is a `try_send` into the
//! connection's bounded outbound queue. A full queue drops the message for
//! that peer only; a dropped receiver removes the connection from the
//! registry.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use super::connection::{Connection, ConnectionId, DeliveryError};

/// Sizing for the hub.
#[derive(Debug, Clone, Copy)]
pub struct HubConfig {
    /// Pending commands the actor queue holds before callers wait.
    pub command_capacity: usize,
    /// Per-connection outbound queue length.
    pub outbound_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig {
            command_capacity: 1024,
            outbound_capacity: 64,
        }
    }
}

/// Errors from hub operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The actor task is no longer running.
    #[error("broadcast hub has shut down")]
    Shutdown,
}

enum HubCommand {
    Register(Connection),
    Unregister(ConnectionId),
    Broadcast {
        sender: ConnectionId,
        payload: String,
        reply: oneshot::Sender<usize>,
    },
    Count(oneshot::Sender<usize>),
}

/// Cloneable handle to the broadcast actor.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    commands: mpsc::Sender<HubCommand>,
    outbound_capacity: usize,
}

impl std::fmt::Debug for HubCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubCommand::Register(conn) => write!(f, "Register({})", conn.id()),
            HubCommand::Unregister(id) => write!(f, "Unregister({})", id),
            HubCommand::Broadcast { sender, .. } => write!(f, "Broadcast(from {})", sender),
            HubCommand::Count(_) => write!(f, "Count"),
        }
    }
}

impl BroadcastHub {
    /// Spawns the actor task on the current tokio runtime.
    pub fn spawn(config: HubConfig) -> Self {
        let (commands, inbox) = mpsc::channel(config.command_capacity.max(1));
        tokio::spawn(run(inbox));
        BroadcastHub {
            commands,
            outbound_capacity: config.outbound_capacity.max(1),
        }
    }

    /// Outbound queue length the transport should open connections with.
    pub fn outbound_capacity(&self) -> usize {
        self.outbound_capacity
    }

    /// Adds a connection to the active set.
    pub async fn register(&self, connection: Connection) -> Result<(), HubError> {
        self.send(HubCommand::Register(connection)).await
    }

    /// Removes a connection from the active set. Removing an unknown or
    /// already-removed connection is a no-op.
    pub async fn unregister(&self, id: ConnectionId) -> Result<(), HubError> {
        self.send(HubCommand::Unregister(id)).await
    }

    /// Delivers `payload` to every open connection, the sender included.
    ///
    /// Returns how many connections the message was queued for. Per-peer
    /// failures are not reported.
    pub async fn broadcast(
        &self,
        sender: ConnectionId,
        payload: impl Into<String>,
    ) -> Result<usize, HubError> {
        let (reply, delivered) = oneshot::channel();
        self.send(HubCommand::Broadcast {
            sender,
            payload: payload.into(),
            reply,
        })
        .await?;
        delivered.await.map_err(|_| HubError::Shutdown)
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> Result<usize, HubError> {
        let (reply, count) = oneshot::channel();
        self.send(HubCommand::Count(reply)).await?;
        count.await.map_err(|_| HubError::Shutdown)
    }

    async fn send(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| HubError::Shutdown)
    }
}

async fn run(mut inbox: mpsc::Receiver<HubCommand>) {
    let mut registry = Registry::default();
    while let Some(command) = inbox.recv().await {
        match command {
            HubCommand::Register(connection) => {
                let id = connection.id();
                registry.register(connection);
                tracing::info!(connection = %id, active = registry.len(), "connection registered");
            }
            HubCommand::Unregister(id) => {
                if registry.unregister(id) {
                    tracing::info!(connection = %id, active = registry.len(), "connection unregistered");
                }
            }
            HubCommand::Broadcast {
                sender,
                payload,
                reply,
            } => {
                let delivered = registry.fan_out(&payload);
                tracing::debug!(
                    connection = %sender,
                    bytes = payload.len(),
                    delivered,
                    "message broadcast"
                );
                // The caller may have stopped waiting; delivery already happened.
                let _ = reply.send(delivered);
            }
            HubCommand::Count(reply) => {
                let _ = reply.send(registry.len());
            }
        }
    }
    tracing::debug!("broadcast hub stopped");
}

/// The set of registered connections. Owned by the actor task.
#[derive(Debug, Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
}

impl Registry {
    fn register(&mut self, connection: Connection) {
        self.connections.insert(connection.id(), connection);
    }

    fn unregister(&mut self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    fn len(&self) -> usize {
        self.connections.len()
    }

    /// Queues `payload` on every open connection. Returns the number of
    /// successful deliveries.
    fn fan_out(&mut self, payload: &str) -> usize {
        let mut delivered = 0;
        let mut disconnected = Vec::new();

        for (id, connection) in &self.connections {
            match connection.try_deliver(payload.to_owned()) {
                Ok(()) => delivered += 1,
                Err(DeliveryError::NotOpen) => {
                    tracing::debug!(connection = %id, "skipping connection that is not open");
                }
                Err(DeliveryError::QueueFull) => {
                    tracing::debug!(connection = %id, "outbound queue full, message dropped");
                }
                Err(DeliveryError::Disconnected) => disconnected.push(*id),
            }
        }

        for id in disconnected {
            self.connections.remove(&id);
            tracing::debug!(connection = %id, "pruned disconnected connection");
        }
        delivered
    }
}
