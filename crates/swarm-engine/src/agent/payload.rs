//! Payload activity: role-specific terminal action at target (spec §4.3).

use std::sync::Arc;

use swarm_core::event::{CamReportResult, Event, EventKind};
use swarm_core::model::{Liveness, NavState, Role};

use crate::agent::AgentContext;
use crate::world::{Mutation, MutationOutcome};

pub async fn run(ctx: Arc<AgentContext>) {
    let mut ticker = tokio::time::interval(ctx.timing.tick_period);
    let mut shutdown = ctx.shutdown.subscribe();

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = ticker.tick() => {
                let Some(record) = ctx.world.snapshot(ctx.drone_id) else { return };

                match record.role {
                    Role::Attack => {
                        if record.liveness.is_terminal() {
                            return;
                        }
                        if record.nav_state != NavState::AtTarget || !record.armed {
                            continue;
                        }
                        let Some((record, outcome)) = ctx.world.mutate(ctx.drone_id, Mutation::MarkDetonated) else { return };
                        if outcome == MutationOutcome::Applied {
                            if let Err(err) = ctx.events.emit(Event::new(EventKind::Detonated, ctx.drone_id, record.swarm_id, 0, "detonation")).await {
                                tracing::error!(drone_id = ctx.drone_id, %err, "failed to emit Detonated");
                            }
                        }
                        return;
                    }
                    Role::Camera => {
                        // A camera keeps assessing its Attack peers even
                        // after its own fate (fuel, defence, link) is
                        // decided: BDA observes the peers, not the
                        // camera's own position (spec.md S5).
                        let peers = ctx.world.iterate_all();
                        let mut detonated = 0usize;
                        let mut alive = 0usize;
                        for peer in peers.iter().filter(|p| p.swarm_id == record.swarm_id && p.role == Role::Attack) {
                            match peer.liveness {
                                Liveness::Detonated => detonated += 1,
                                Liveness::Alive => alive += 1,
                                _ => {}
                            }
                        }

                        let result = if detonated >= 2 {
                            Some(CamReportResult::Destroyed)
                        } else if alive == 0 {
                            Some(CamReportResult::Partial)
                        } else {
                            None
                        };

                        let Some(result) = result else {
                            continue;
                        };

                        if let Err(err) = ctx.events.emit(Event::cam_report(ctx.drone_id, record.swarm_id, result, "battle damage assessment")).await {
                            tracing::error!(drone_id = ctx.drone_id, %err, "failed to emit CamReport");
                        }
                        ctx.world.mutate(ctx.drone_id, Mutation::MarkMissionComplete);
                        return;
                    }
                }
            }
        }
    }
}
