//! Navigation activity: drives the per-drone state machine (spec §4.3).

use std::sync::Arc;

use swarm_core::event::{Event, EventKind};
use swarm_core::geometry::{has_reached, loiter_offset, step_towards};
use swarm_core::model::NavState;

use crate::agent::AgentContext;
use crate::world::Mutation;

pub async fn run(ctx: Arc<AgentContext>) {
    let mut ticker = tokio::time::interval(ctx.timing.tick_period);
    let mut shutdown = ctx.shutdown.subscribe();
    let mut loiter_tick: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = ticker.tick() => {
                let Some(record) = ctx.world.snapshot(ctx.drone_id) else { return };
                if record.liveness.is_terminal() {
                    return;
                }

                let Some(swarm) = ctx.swarms.get(record.swarm_id as usize) else {
                    tracing::error!(drone_id = ctx.drone_id, swarm_id = record.swarm_id, "unknown swarm id");
                    return;
                };

                match record.nav_state {
                    NavState::Created | NavState::AtTarget => {
                        // Command-gated or payload-gated: nothing for
                        // navigation to do until comms/payload advance it.
                    }
                    NavState::AtReassembly => {
                        if record.attack_cleared && record.target_set {
                            ctx.world.mutate(ctx.drone_id, Mutation::SetArmed(true));
                            ctx.world.mutate(ctx.drone_id, Mutation::SetNavState(NavState::FlyingToTarget));
                        }
                    }
                    NavState::FlyingToAssembly => {
                        let (next, moved) = step_towards(record.position, swarm.assembly_point, ctx.timing.speed);
                        ctx.world.mutate(ctx.drone_id, Mutation::SetPosition(next));
                        ctx.world.mutate(ctx.drone_id, Mutation::AddDistance(moved));
                        if has_reached(next, swarm.assembly_point) {
                            ctx.world.mutate(ctx.drone_id, Mutation::SetReady);
                            ctx.world.mutate(ctx.drone_id, Mutation::SetNavState(NavState::CirclingAssembly));
                            emit(&ctx, EventKind::Ready, "reached assembly point").await;
                        }
                    }
                    NavState::CirclingAssembly => {
                        let offset = loiter_offset(loiter_tick);
                        loiter_tick += 1;
                        let loiter_target = swarm_core::model::Position::new(
                            swarm.assembly_point.x + offset.x,
                            swarm.assembly_point.y + offset.y,
                        );
                        let (next, moved) = step_towards(record.position, loiter_target, ctx.timing.speed.max(1));
                        ctx.world.mutate(ctx.drone_id, Mutation::SetPosition(next));
                        ctx.world.mutate(ctx.drone_id, Mutation::AddDistance(moved));
                    }
                    NavState::FlyingToReassembly => {
                        let (next, moved) = step_towards(record.position, swarm.reassembly_point, ctx.timing.speed);
                        ctx.world.mutate(ctx.drone_id, Mutation::SetPosition(next));
                        ctx.world.mutate(ctx.drone_id, Mutation::AddDistance(moved));
                        if has_reached(next, swarm.reassembly_point) {
                            ctx.world.mutate(ctx.drone_id, Mutation::SetNavState(NavState::AtReassembly));
                            emit(&ctx, EventKind::AtReassembly, "reached reassembly point").await;
                        }
                    }
                    NavState::FlyingToTarget => {
                        let (next, moved) = step_towards(record.position, record.target, ctx.timing.speed);
                        ctx.world.mutate(ctx.drone_id, Mutation::SetPosition(next));
                        ctx.world.mutate(ctx.drone_id, Mutation::AddDistance(moved));
                        if has_reached(next, record.target) {
                            ctx.world.mutate(ctx.drone_id, Mutation::SetNavState(NavState::AtTarget));
                            emit(&ctx, EventKind::AtTarget, "reached target").await;
                        }
                    }
                    NavState::Detonated
                    | NavState::Destroyed
                    | NavState::MissionComplete
                    | NavState::FuelEmpty
                    | NavState::LinkLost => return,
                }
            }
        }
    }
}

async fn emit(ctx: &AgentContext, kind: EventKind, message: &str) {
    let Some(record) = ctx.world.snapshot(ctx.drone_id) else { return };
    if let Err(err) = ctx.events.emit(Event::new(kind, ctx.drone_id, record.swarm_id, 0, message)).await {
        tracing::error!(drone_id = ctx.drone_id, %err, "failed to emit navigation event");
    }
}
