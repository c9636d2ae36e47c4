//! Event Bus and Command Channels (spec §4.2).

use dashmap::DashMap;
use swarm_core::command::Command;
use swarm_core::event::Event;
use swarm_core::model::DroneId;
use thiserror::Error;
use tokio::sync::mpsc;

pub const EVENT_BUS_CAPACITY: usize = 4096;
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("event bus receiver has been dropped; the Command Centre is no longer reading events")]
    BusClosed,
    #[error("no command channel registered for drone {0}")]
    UnknownDrone(DroneId),
    #[error("command channel for drone {0} is closed")]
    ChannelClosed(DroneId),
}

/// Single-reader, multi-writer event channel (spec.md §4.2). Cloning
/// an `EventBus` hands out another writer handle; there is exactly
/// one `EventReceiver` per mission, held by the Command Centre.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::Sender<Event>,
}

pub struct EventReceiver {
    rx: mpsc::Receiver<Event>,
}

impl EventBus {
    pub fn channel(capacity: usize) -> (EventBus, EventReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (EventBus { tx }, EventReceiver { rx })
    }

    /// Emits an event. Bounded buffering is fine (spec.md §4.2) - a
    /// full bus backpressures the emitting drone rather than drops
    /// the event. The only error case is the Centre having gone away,
    /// which spec.md §7 treats as a fatal fault for the whole mission.
    pub async fn emit(&self, event: Event) -> Result<(), TransportError> {
        self.tx.send(event).await.map_err(|_| TransportError::BusClosed)
    }
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// One command channel per drone (spec.md §4.2): Centre writes, the
/// drone's comms activity reads. Registration happens at drone spawn;
/// channels are never removed, so a late broadcast to an already-
/// terminal drone simply finds a closed receiver and is logged, not
/// treated as fatal (the drone's own terminal transition already won).
pub struct CommandChannels {
    senders: DashMap<DroneId, mpsc::Sender<Command>>,
}

impl CommandChannels {
    pub fn new() -> Self {
        Self { senders: DashMap::new() }
    }

    pub fn register(&self, drone_id: DroneId, capacity: usize) -> mpsc::Receiver<Command> {
        let (tx, rx) = mpsc::channel(capacity);
        self.senders.insert(drone_id, tx);
        rx
    }

    pub async fn send(&self, drone_id: DroneId, command: Command) -> Result<(), TransportError> {
        let sender = self
            .senders
            .get(&drone_id)
            .map(|s| s.clone())
            .ok_or(TransportError::UnknownDrone(drone_id))?;
        sender.send(command).await.map_err(|_| TransportError::ChannelClosed(drone_id))
    }

    /// Broadcasts a command to every registered drone. Per-drone
    /// failures (the drone already exited) are logged and skipped  - 
    /// spec.md §4.7: a single drone's fate never propagates to peers.
    pub async fn broadcast(&self, command: Command) {
        let ids: Vec<DroneId> = self.senders.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Err(err) = self.send(id, command).await {
                tracing::debug!(drone_id = id, error = %err, "broadcast command not delivered");
            }
        }
    }
}

impl Default for CommandChannels {
    fn default() -> Self {
        Self::new()
    }
}
