//! Drone Agent: the four concurrent activities of spec §4.3, spawned
//! per drone and coordinated entirely through `WorldState` - no
//! activity holds a drone-record lock across a suspension point
//! (spec §5).

mod comms;
mod fuel;
mod navigation;
mod payload;

use std::sync::Arc;
use std::time::Duration;

use swarm_core::model::{DroneId, SwarmConfig};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::transport::EventBus;
use crate::world::WorldState;

#[derive(Clone, Copy)]
pub struct MissionTiming {
    pub tick_period: Duration,
    pub link_loss_pct: u8,
    pub reconnect_timeout_ticks: u64,
    pub speed: i32,
}

pub struct AgentContext {
    pub drone_id: DroneId,
    pub world: Arc<WorldState>,
    pub events: EventBus,
    pub swarms: Arc<Vec<SwarmConfig>>,
    pub timing: MissionTiming,
    pub shutdown: broadcast::Sender<()>,
    pub rng_seed: u64,
}

/// Spawns the four per-drone activities and returns their join
/// handles. The caller (the Command Centre's runtime) awaits all of
/// them before the mission is considered Done.
pub fn spawn(ctx: Arc<AgentContext>, command_rx: mpsc::Receiver<swarm_core::command::Command>) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(navigation::run(ctx.clone())),
        tokio::spawn(fuel::run(ctx.clone())),
        tokio::spawn(comms::run(ctx.clone(), command_rx)),
        tokio::spawn(payload::run(ctx)),
    ]
}
