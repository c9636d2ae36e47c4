//! The retasking algorithm (spec §4.6) - the interesting subroutine.
//!
//! Pure and deterministic: no RNG, no I/O. `swarm-engine` snapshots
//! World State into `RetaskCandidate`s (ascending drone-id order, so
//! the result is reproducible per spec.md §4.6's "Ordering /
//! tie-break policy"), calls `retask`, then replays the returned
//! `Reassignment`s as `SetSwarm` commands.

use std::collections::{HashMap, HashSet};

use crate::model::{DroneId, Role, SwarmId};

#[derive(Debug, Clone, Copy)]
pub struct RetaskCandidate {
    pub drone_id: DroneId,
    pub swarm_id: SwarmId,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment {
    pub drone_id: DroneId,
    pub from_swarm: SwarmId,
    pub to_swarm: SwarmId,
}

/// Runs one retasking round. `swarm_ids` must be the contiguous
/// `0..swarm_ids.len()` id space produced by `default_swarms` (the
/// alternating-offset arithmetic in spec.md §4.6 is defined over that
/// index space). `candidates` must already be filtered to Alive
/// drones past the re-assembly threshold (I6) - anything else is
/// invisible to this function, matching spec.md §4.7 ("lost drones do
/// not participate in retasking").
pub fn retask(candidates: &[RetaskCandidate], swarm_ids: &[SwarmId], nominal_count: usize) -> Vec<Reassignment> {
    let n = swarm_ids.len() as i64;
    if n == 0 {
        return Vec::new();
    }

    let mut count: HashMap<SwarmId, i64> = swarm_ids.iter().map(|&s| (s, 0)).collect();
    let mut swarm_of: HashMap<DroneId, SwarmId> = HashMap::new();
    for c in candidates {
        *count.entry(c.swarm_id).or_insert(0) += 1;
        swarm_of.insert(c.drone_id, c.swarm_id);
    }

    let mut locked: HashSet<DroneId> = HashSet::new();
    let mut reassignments = Vec::new();

    for &s_need in swarm_ids {
        loop {
            if count[&s_need] >= nominal_count as i64 {
                break;
            }

            let mut progressed = false;
            'search: for off in 1..n {
                for candidate_give in [s_need as i64 - off, s_need as i64 + off] {
                    if candidate_give < 0 || candidate_give >= n {
                        continue;
                    }
                    let s_give = candidate_give as SwarmId;
                    if count[&s_give] <= nominal_count as i64 {
                        continue;
                    }

                    for allow_camera in [false, true] {
                        if let Some(drone_id) = pick_donor(candidates, &swarm_of, &locked, s_give, allow_camera) {
                            swarm_of.insert(drone_id, s_need);
                            locked.insert(drone_id);
                            *count.get_mut(&s_give).unwrap() -= 1;
                            *count.get_mut(&s_need).unwrap() += 1;
                            reassignments.push(Reassignment { drone_id, from_swarm: s_give, to_swarm: s_need });
                            progressed = true;
                            break 'search;
                        }
                    }
                }
            }

            if !progressed {
                break;
            }
        }
    }

    reassignments
}

fn pick_donor(
    candidates: &[RetaskCandidate],
    swarm_of: &HashMap<DroneId, SwarmId>,
    locked: &HashSet<DroneId>,
    s_give: SwarmId,
    allow_camera: bool,
) -> Option<DroneId> {
    candidates
        .iter()
        .filter(|c| swarm_of.get(&c.drone_id) == Some(&s_give))
        .filter(|c| !locked.contains(&c.drone_id))
        .filter(|c| allow_camera || c.role == Role::Attack)
        .map(|c| c.drone_id)
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates_with_counts(counts: &[usize]) -> Vec<RetaskCandidate> {
        let mut id = 0;
        let mut out = Vec::new();
        for (swarm_id, &n) in counts.iter().enumerate() {
            for i in 0..n {
                // first drone of each swarm is a Camera so the
                // non-camera-preference rule is exercised too.
                let role = if i == 0 { Role::Camera } else { Role::Attack };
                out.push(RetaskCandidate { drone_id: id, swarm_id: swarm_id as SwarmId, role });
                id += 1;
            }
        }
        out
    }

    #[test]
    fn s3_fairness_redistributes_to_nominal() {
        // spec.md S3: counts {6,5,4} -> {5,5,5}.
        let candidates = candidates_with_counts(&[6, 5, 4]);
        let swarm_ids = [0, 1, 2];
        let reassignments = retask(&candidates, &swarm_ids, 5);

        assert_eq!(reassignments.len(), 1);
        let r = reassignments[0];
        assert_eq!(r.from_swarm, 0);
        assert_eq!(r.to_swarm, 2);
        // first non-Camera Alive drone in swarm 0's record order is id 1
        // (id 0 is swarm 0's Camera).
        assert_eq!(r.drone_id, 1);

        let mut final_counts = [6i64, 5, 4];
        final_counts[r.from_swarm as usize] -= 1;
        final_counts[r.to_swarm as usize] += 1;
        assert_eq!(final_counts, [5, 5, 5]);
    }

    #[test]
    fn no_op_when_counts_already_nominal() {
        let candidates = candidates_with_counts(&[5, 5, 5]);
        let swarm_ids = [0, 1, 2];
        assert!(retask(&candidates, &swarm_ids, 5).is_empty());
    }

    #[test]
    fn no_progress_when_no_surplus_exists() {
        // a deficient swarm with no surplus donor anywhere: retask
        // terminates without infinite-looping (spec.md §4.6 step 4).
        let candidates = candidates_with_counts(&[4, 5, 5]);
        let swarm_ids = [0, 1, 2];
        assert!(retask(&candidates, &swarm_ids, 5).is_empty());
    }

    #[test]
    fn a_drone_is_never_reassigned_twice_in_one_round() {
        let candidates = candidates_with_counts(&[8, 3, 3]);
        let swarm_ids = [0, 1, 2];
        let reassignments = retask(&candidates, &swarm_ids, 5);

        let mut seen = HashSet::new();
        for r in &reassignments {
            assert!(seen.insert(r.drone_id), "drone {} reassigned twice in one round", r.drone_id);
        }
    }

    #[test]
    fn camera_is_used_only_as_a_fallback_donor() {
        // swarm 0 has exactly one surplus drone and it's a Camera.
        let mut candidates = candidates_with_counts(&[6, 5, 4]);
        for c in candidates.iter_mut().filter(|c| c.swarm_id == 0) {
            c.role = Role::Camera;
        }
        let swarm_ids = [0, 1, 2];
        let reassignments = retask(&candidates, &swarm_ids, 5);
        assert_eq!(reassignments.len(), 1);
        assert_eq!(reassignments[0].from_swarm, 0);
    }
}
