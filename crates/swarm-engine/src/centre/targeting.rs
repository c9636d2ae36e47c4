//! Randomised target assignment at Retask->Attack (spec §4.5).

use std::collections::HashMap;

use rand::Rng;
use swarm_core::model::{ObjectiveId, ObjectiveRecord, SwarmConfig, SwarmId};
use swarm_core::shuffle::fisher_yates;

/// Shuffles the objective set with Fisher-Yates and zips it against
/// swarms in ascending id order, so swarm `i` attacks the objective
/// now sitting at permutation index `i`.
pub fn assign_targets(swarms: &[SwarmConfig], objectives: &[ObjectiveRecord], rng: &mut impl Rng) -> HashMap<SwarmId, ObjectiveId> {
    let mut permuted: Vec<ObjectiveId> = objectives.iter().map(|o| o.id).collect();
    fisher_yates(&mut permuted, rng);

    let mut sorted_swarms: Vec<SwarmId> = swarms.iter().map(|s| s.id).collect();
    sorted_swarms.sort_unstable();

    sorted_swarms.into_iter().zip(permuted).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use swarm_core::model::{default_objectives, default_swarms};

    #[test]
    fn assignment_is_a_bijection_over_swarms_and_objectives() {
        let swarms = default_swarms();
        let objectives = default_objectives();
        let mut rng = StdRng::seed_from_u64(9);
        let assignment = assign_targets(&swarms, &objectives, &mut rng);

        assert_eq!(assignment.len(), swarms.len());
        let mut objective_ids: Vec<ObjectiveId> = assignment.values().copied().collect();
        objective_ids.sort_unstable();
        let mut expected: Vec<ObjectiveId> = objectives.iter().map(|o| o.id).collect();
        expected.sort_unstable();
        assert_eq!(objective_ids, expected);
    }
}
