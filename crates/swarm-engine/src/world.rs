//! World State (spec §4.1): the process-wide shared record table.
//!
//! One `DashMap` entry per drone, mirroring the teacher's
//! `AppState { drones: DashMap<String, DroneState>, .. }` - each
//! entry is its own lock domain, so single-record mutations are
//! atomic and iteration never holds more than one guard at a time.

use dashmap::DashMap;
use swarm_core::model::{DroneId, DroneRecord, LinkStatus, Liveness, NavState, Position, Role, SwarmId};

/// The mutation vocabulary of spec.md §4.1. Centralising every field
/// write here is what makes invariants I2 ("fuel/distance monotonic")
/// and spec.md §4.7 ("first terminal transition wins") enforceable at
/// a single point instead of scattered across four activities.
#[derive(Debug, Clone, Copy)]
pub enum Mutation {
    SetPosition(Position),
    SetTarget(Position),
    DecrementFuel(i64),
    AddDistance(i64),
    MarkDestroyed,
    MarkFuelEmpty,
    MarkDetonated,
    MarkMissionComplete,
    MarkLinkLost,
    SetReady,
    SetSwarm(SwarmId),
    SetLinkUp,
    SetLinkDown { since_tick: u64 },
    SetArmed(bool),
    SetNavState(NavState),
    ClearForAttack,
}

/// Whether a mutation actually changed the record, or was discarded
/// because the drone was already terminal (spec.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NoOp,
}

pub struct WorldState {
    drones: DashMap<DroneId, DroneRecord>,
}

impl WorldState {
    pub fn new(initial: Vec<DroneRecord>) -> Self {
        let drones = DashMap::with_capacity(initial.len());
        for record in initial {
            drones.insert(record.id, record);
        }
        Self { drones }
    }

    /// Atomic read of a single record (spec.md §4.1).
    pub fn snapshot(&self, drone_id: DroneId) -> Option<DroneRecord> {
        self.drones.get(&drone_id).map(|r| r.clone())
    }

    /// Applies one mutation atomically, returning the post-mutation
    /// snapshot and whether it actually changed anything.
    pub fn mutate(&self, drone_id: DroneId, delta: Mutation) -> Option<(DroneRecord, MutationOutcome)> {
        let mut entry = self.drones.get_mut(&drone_id)?;
        let outcome = apply(&mut entry, delta);
        Some((entry.clone(), outcome))
    }

    /// Per-record snapshots of every Alive drone, sorted by id so
    /// callers (retasking, defence sampling) see a deterministic,
    /// reproducible record order (spec.md §4.6 tie-break policy).
    /// This is a sequence of independent snapshots, not a global
    /// cross-record snapshot - spec.md §4.1 explicitly allows that.
    pub fn iterate_active(&self) -> Vec<DroneRecord> {
        let mut out: Vec<DroneRecord> = self
            .drones
            .iter()
            .filter(|r| r.is_alive())
            .map(|r| r.clone())
            .collect();
        out.sort_by_key(|r| r.id);
        out
    }

    /// All drones regardless of liveness, sorted by id - used for the
    /// final mission report and for phase-predicate counters that
    /// need to see terminal drones too (e.g. "all cameras terminal").
    pub fn iterate_all(&self) -> Vec<DroneRecord> {
        let mut out: Vec<DroneRecord> = self.drones.iter().map(|r| r.clone()).collect();
        out.sort_by_key(|r| r.id);
        out
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }
}

fn apply(record: &mut DroneRecord, delta: Mutation) -> MutationOutcome {
    // Once a drone is terminal, only housekeeping mutations that
    // don't contest liveness are allowed through (e.g. a late
    // position update from an in-flight step that raced a defence
    // hit). Anything that would assign a *different* terminal state
    // is discarded: first to commit wins (spec.md §4.7).
    let already_terminal = record.liveness.is_terminal();

    match delta {
        Mutation::SetPosition(pos) => {
            record.position = pos;
            MutationOutcome::Applied
        }
        Mutation::SetTarget(pos) => {
            record.target = pos;
            record.target_set = true;
            MutationOutcome::Applied
        }
        Mutation::ClearForAttack => {
            record.attack_cleared = true;
            MutationOutcome::Applied
        }
        Mutation::DecrementFuel(amount) => {
            if amount > 0 {
                record.fuel = (record.fuel - amount).max(0);
            }
            MutationOutcome::Applied
        }
        Mutation::AddDistance(amount) => {
            if amount > 0 {
                record.distance_traveled += amount;
            }
            MutationOutcome::Applied
        }
        Mutation::MarkDestroyed => set_terminal(record, already_terminal, Liveness::Destroyed, NavState::Destroyed),
        Mutation::MarkFuelEmpty => set_terminal(record, already_terminal, Liveness::FuelEmpty, NavState::FuelEmpty),
        Mutation::MarkDetonated => {
            if already_terminal || record.detonated || record.role != Role::Attack {
                return MutationOutcome::NoOp;
            }
            record.detonated = true;
            record.liveness = Liveness::Detonated;
            record.nav_state = NavState::Detonated;
            MutationOutcome::Applied
        }
        Mutation::MarkMissionComplete => {
            set_terminal(record, already_terminal, Liveness::MissionComplete, NavState::MissionComplete)
        }
        Mutation::MarkLinkLost => set_terminal(record, already_terminal, Liveness::LinkLost, NavState::LinkLost),
        Mutation::SetReady => {
            record.ready = true;
            MutationOutcome::Applied
        }
        Mutation::SetSwarm(swarm_id) => {
            record.swarm_id = swarm_id;
            MutationOutcome::Applied
        }
        Mutation::SetLinkUp => {
            record.link = LinkStatus::Up;
            record.link_down_since_tick = None;
            MutationOutcome::Applied
        }
        Mutation::SetLinkDown { since_tick } => {
            record.link = LinkStatus::Down;
            record.link_down_since_tick = Some(since_tick);
            MutationOutcome::Applied
        }
        Mutation::SetArmed(armed) => {
            record.armed = armed;
            MutationOutcome::Applied
        }
        Mutation::SetNavState(nav_state) => {
            if already_terminal && nav_state != record.nav_state {
                return MutationOutcome::NoOp;
            }
            record.nav_state = nav_state;
            MutationOutcome::Applied
        }
    }
}

fn set_terminal(record: &mut DroneRecord, already_terminal: bool, liveness: Liveness, nav_state: NavState) -> MutationOutcome {
    if already_terminal {
        return MutationOutcome::NoOp;
    }
    record.liveness = liveness;
    record.nav_state = nav_state;
    MutationOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::model::{Position, Role};

    fn world_with_one_drone() -> (WorldState, DroneId) {
        let record = DroneRecord::new(0, 0, 0, Role::Attack, Position::new(0, 0), 100, 0);
        (WorldState::new(vec![record]), 0)
    }

    #[test]
    fn first_terminal_transition_wins() {
        let (world, id) = world_with_one_drone();
        let (_, first) = world.mutate(id, Mutation::MarkDestroyed).unwrap();
        assert_eq!(first, MutationOutcome::Applied);

        let (record, second) = world.mutate(id, Mutation::MarkFuelEmpty).unwrap();
        assert_eq!(second, MutationOutcome::NoOp);
        assert_eq!(record.liveness, Liveness::Destroyed);
    }

    #[test]
    fn detonation_is_at_most_once() {
        let (world, id) = world_with_one_drone();
        let (_, first) = world.mutate(id, Mutation::MarkDetonated).unwrap();
        assert_eq!(first, MutationOutcome::Applied);
        let (_, second) = world.mutate(id, Mutation::MarkDetonated).unwrap();
        assert_eq!(second, MutationOutcome::NoOp);
    }

    #[test]
    fn fuel_and_distance_are_monotonic() {
        let (world, id) = world_with_one_drone();
        world.mutate(id, Mutation::DecrementFuel(10));
        world.mutate(id, Mutation::AddDistance(5));
        let before = world.snapshot(id).unwrap();
        world.mutate(id, Mutation::DecrementFuel(-999)); // malformed input, must not raise fuel
        world.mutate(id, Mutation::AddDistance(-999));
        let after = world.snapshot(id).unwrap();
        assert!(after.fuel <= before.fuel);
        assert!(after.distance_traveled >= before.distance_traveled);
    }

    #[test]
    fn iterate_active_is_sorted_and_excludes_terminal() {
        let a = DroneRecord::new(2, 0, 0, Role::Attack, Position::new(0, 0), 100, 0);
        let b = DroneRecord::new(1, 0, 0, Role::Attack, Position::new(0, 0), 100, 0);
        let world = WorldState::new(vec![a, b]);
        world.mutate(2, Mutation::MarkDestroyed);

        let active = world.iterate_active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 1);
    }
}
