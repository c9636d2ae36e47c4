//! Defence Sampler (spec §4.4): an independent periodic activity that
//! mutates World State directly rather than communicating through an
//! agent channel.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swarm_core::event::{Event, EventKind};
use swarm_core::geometry::within_defence_envelope;
use swarm_core::model::{DefenceRecord, ASSEMBLY_ZONE_MAX, DEFENSE_ZONE_MAX};
use tokio::sync::broadcast;

use crate::transport::EventBus;
use crate::world::{Mutation, MutationOutcome, WorldState};

pub async fn run(
    defence: DefenceRecord,
    world: Arc<WorldState>,
    events: EventBus,
    sample_period: Duration,
    rng_seed: u64,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(sample_period);
    let mut rng = StdRng::seed_from_u64(rng_seed);

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = ticker.tick() => {
                for drone in world.iterate_active() {
                    if !within_defence_envelope(drone.position, defence.position, ASSEMBLY_ZONE_MAX, DEFENSE_ZONE_MAX) {
                        continue;
                    }

                    let roll = rng.random_range(0..100);
                    if roll >= defence.hit_probability_pct {
                        continue;
                    }

                    let Some((record, outcome)) = world.mutate(drone.id, Mutation::MarkDestroyed) else { continue };
                    if outcome == MutationOutcome::Applied {
                        if let Err(err) = events
                            .emit(Event::new(EventKind::Destroyed, drone.id, record.swarm_id, defence.id as i64, "destroyed by defence"))
                            .await
                        {
                            tracing::error!(drone_id = drone.id, defence_id = defence.id, %err, "failed to emit Destroyed");
                        }
                    }
                }
            }
        }
    }
}
