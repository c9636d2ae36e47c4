//! Communications activity: reads the per-drone command channel and
//! simulates link flapping (spec §4.3).

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swarm_core::command::{Command, CommandKind};
use swarm_core::event::{Event, EventKind};
use swarm_core::model::{LinkStatus, NavState};

use crate::agent::AgentContext;
use crate::world::Mutation;

const LINK_RECOVERY_PCT: u8 = 50;

pub async fn run(ctx: Arc<AgentContext>, mut command_rx: tokio::sync::mpsc::Receiver<Command>) {
    let mut ticker = tokio::time::interval(ctx.timing.tick_period);
    let mut shutdown = ctx.shutdown.subscribe();
    let mut rng = StdRng::seed_from_u64(ctx.rng_seed);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            command = command_rx.recv() => {
                let Some(command) = command else { return };
                let Some(record) = ctx.world.snapshot(ctx.drone_id) else { return };
                if record.liveness.is_terminal() {
                    continue;
                }
                if record.link == LinkStatus::Up {
                    handle_command(&ctx, command).await;
                } else {
                    // Commands arriving while the link is Down are
                    // dropped, never buffered (mandated, not optional).
                    tracing::debug!(drone_id = ctx.drone_id, "dropping command while link is down");
                }
            }
            _ = ticker.tick() => {
                tick += 1;
                let Some(record) = ctx.world.snapshot(ctx.drone_id) else { return };
                if record.liveness.is_terminal() {
                    return;
                }

                match record.link {
                    LinkStatus::Up => {
                        if rng.random_range(0..100) < ctx.timing.link_loss_pct {
                            ctx.world.mutate(ctx.drone_id, Mutation::SetLinkDown { since_tick: tick });
                        }
                    }
                    LinkStatus::Down => {
                        let since = record.link_down_since_tick.unwrap_or(tick);
                        if tick.saturating_sub(since) >= ctx.timing.reconnect_timeout_ticks {
                            let Some((record, outcome)) = ctx.world.mutate(ctx.drone_id, Mutation::MarkLinkLost) else { return };
                            if outcome == crate::world::MutationOutcome::Applied {
                                if let Err(err) = ctx.events.emit(Event::new(EventKind::DroneLost, ctx.drone_id, record.swarm_id, 0, "link outage exceeded timeout")).await {
                                    tracing::error!(drone_id = ctx.drone_id, %err, "failed to emit DroneLost");
                                }
                            }
                            return;
                        } else if rng.random_range(0..100) < LINK_RECOVERY_PCT {
                            ctx.world.mutate(ctx.drone_id, Mutation::SetLinkUp);
                            if let Err(err) = ctx.events.emit(Event::new(EventKind::LinkRestored, ctx.drone_id, record.swarm_id, 0, "link restored")).await {
                                tracing::error!(drone_id = ctx.drone_id, %err, "failed to emit LinkRestored");
                            }
                        }
                    }
                }
            }
        }
    }
}

async fn handle_command(ctx: &AgentContext, command: Command) {
    let Some(record) = ctx.world.snapshot(ctx.drone_id) else { return };
    match command.kind {
        CommandKind::Takeoff => {
            if record.nav_state == NavState::Created {
                ctx.world.mutate(ctx.drone_id, Mutation::SetNavState(NavState::FlyingToAssembly));
            }
        }
        CommandKind::Proceed => {
            if record.nav_state == NavState::CirclingAssembly {
                ctx.world.mutate(ctx.drone_id, Mutation::SetNavState(NavState::FlyingToReassembly));
            }
        }
        CommandKind::GoAttack => {
            // Applied unconditionally: a drone still short of
            // AtReassembly when this arrives (Proceed->Retask advanced
            // on the 10s timeout with stragglers in flight) latches
            // the clearance and attacks as soon as it arrives - see
            // `DroneRecord::attack_cleared`.
            ctx.world.mutate(ctx.drone_id, Mutation::ClearForAttack);
        }
        CommandKind::SetSwarm { swarm_id } => {
            ctx.world.mutate(ctx.drone_id, Mutation::SetSwarm(swarm_id));
        }
        CommandKind::SetTarget { position } => {
            ctx.world.mutate(ctx.drone_id, Mutation::SetTarget(position));
        }
        CommandKind::Shutdown => {
            tracing::debug!(drone_id = ctx.drone_id, "received Shutdown command");
        }
    }
}
