//! Fuel activity: independent of the navigation state machine so fuel
//! stays monotonic regardless of how navigation evolves (spec §4.3, I2).

use std::sync::Arc;

use swarm_core::event::{Event, EventKind};

use crate::agent::AgentContext;
use crate::world::Mutation;

pub async fn run(ctx: Arc<AgentContext>) {
    let mut ticker = tokio::time::interval(ctx.timing.tick_period);
    let mut shutdown = ctx.shutdown.subscribe();
    let mut last_distance: i64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = ticker.tick() => {
                let Some(record) = ctx.world.snapshot(ctx.drone_id) else { return };
                if record.liveness.is_terminal() {
                    return;
                }

                let accrued = record.distance_traveled - last_distance;
                last_distance = record.distance_traveled;
                if accrued <= 0 {
                    continue;
                }

                let Some((record, _)) = ctx.world.mutate(ctx.drone_id, Mutation::DecrementFuel(accrued)) else { return };
                if record.fuel == 0 {
                    let Some((_, outcome)) = ctx.world.mutate(ctx.drone_id, Mutation::MarkFuelEmpty) else { return };
                    if outcome == crate::world::MutationOutcome::Applied {
                        if let Err(err) = ctx.events.emit(Event::new(EventKind::FuelEmpty, ctx.drone_id, record.swarm_id, record.fuel, "fuel exhausted")).await {
                            tracing::error!(drone_id = ctx.drone_id, %err, "failed to emit FuelEmpty");
                        }
                    }
                    return;
                }
            }
        }
    }
}
