//! Core data model for the swarm-mission simulator.

use serde::{Deserialize, Serialize};

pub type DroneId = u32;
pub type SwarmId = u32;
pub type ObjectiveId = u32;
pub type DefenceId = u32;
pub type TruckId = u32;

/// A point on the 100x100 integer grid (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Grid zone boundaries by y-coordinate (spec §6).
pub const ASSEMBLY_ZONE_MAX: i32 = 33;
pub const DEFENSE_ZONE_MAX: i32 = 66;
pub const REASSEMBLY_ZONE_MIN: i32 = 66;
pub const GRID_MAX: i32 = 100;

pub const ASSEMBLY_POINTS: [Position; 3] =
    [Position::new(25, 16), Position::new(50, 16), Position::new(75, 16)];
pub const REASSEMBLY_POINTS: [Position; 3] =
    [Position::new(25, 82), Position::new(50, 82), Position::new(75, 82)];
pub const OBJECTIVE_POINTS: [Position; 3] =
    [Position::new(25, 100), Position::new(50, 100), Position::new(75, 100)];
pub const DEFENCE_POINTS: [Position; 2] = [Position::new(10, 100), Position::new(90, 100)];
pub const TRUCK_POINTS: [Position; 3] =
    [Position::new(25, 0), Position::new(50, 0), Position::new(75, 0)];

pub const DRONES_PER_SWARM: usize = 5;
pub const ATTACK_DRONES_PER_SWARM: usize = 4;
pub const CAMERA_DRONES_PER_SWARM: usize = 1;
pub const NUM_SWARMS: usize = 3;

/// Drone role. Determines which payload activity runs (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Attack,
    Camera,
}

/// Coarse liveness status (spec §3). Mirrors the terminal variants of
/// `NavState` but is tracked separately because the Centre's phase
/// predicates and the retasking algorithm only ever need this, not the
/// fine-grained navigation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Alive,
    Destroyed,
    FuelEmpty,
    Detonated,
    MissionComplete,
    LinkLost,
}

impl Liveness {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Liveness::Alive)
    }
}

/// Per-drone navigation state machine (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavState {
    Created,
    FlyingToAssembly,
    CirclingAssembly,
    FlyingToReassembly,
    AtReassembly,
    FlyingToTarget,
    AtTarget,
    Detonated,
    Destroyed,
    MissionComplete,
    FuelEmpty,
    LinkLost,
}

impl NavState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NavState::Detonated
                | NavState::Destroyed
                | NavState::MissionComplete
                | NavState::FuelEmpty
                | NavState::LinkLost
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Up,
    Down,
}

/// One drone's full record, as held in World State (spec §3, §4.1).
///
/// `target` and `armed` are implementation fields not named in the
/// data model but required to run the navigation/payload activities;
/// see SPEC_FULL.md §2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneRecord {
    pub id: DroneId,
    pub truck_id: TruckId,
    pub swarm_id: SwarmId,
    pub role: Role,
    pub position: Position,
    pub target: Position,
    pub fuel: i64,
    pub distance_traveled: i64,
    pub liveness: Liveness,
    pub nav_state: NavState,
    pub ready: bool,
    pub detonated: bool,
    pub armed: bool,
    /// Set once a `SetTarget` command has been applied. Needed
    /// because `GoAttack` can arrive before a drone reaches
    /// `AtReassembly` (the Proceed→Retask timeout guard lets the
    /// phase advance with stragglers still in flight); the navigation
    /// activity re-checks `attack_cleared && target_set` every tick
    /// instead of only at the instant the command is read, so a
    /// straggler still attacks once it arrives (spec §4.3's
    /// `AtReassembly --GoAttack + target known--> FlyingToTarget`
    /// guard is a standing condition, not a one-shot check).
    pub target_set: bool,
    pub attack_cleared: bool,
    pub link: LinkStatus,
    /// Tick at which the link went Down; valid only while `link ==
    /// Down`. Seconds in spec.md §4.3/§6 are measured in ticks - see
    /// SPEC_FULL.md / DESIGN.md for the tick-as-second simplification.
    pub link_down_since_tick: Option<u64>,
    /// Cosmetic per-drone jitter recovered from original_source, never
    /// consulted by the defence sampler. See SPEC_FULL.md §4.
    pub jitter: u8,
}

impl DroneRecord {
    pub fn new(id: DroneId, truck_id: TruckId, swarm_id: SwarmId, role: Role, position: Position, fuel: i64, jitter: u8) -> Self {
        Self {
            id,
            truck_id,
            swarm_id,
            role,
            position,
            target: position,
            fuel,
            distance_traveled: 0,
            liveness: Liveness::Alive,
            nav_state: NavState::Created,
            ready: false,
            detonated: false,
            armed: false,
            target_set: false,
            attack_cleared: false,
            link: LinkStatus::Up,
            link_down_since_tick: None,
            jitter,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }

    pub fn past_reassembly_threshold(&self) -> bool {
        self.position.y >= DEFENSE_ZONE_MAX
    }
}

/// Static swarm configuration: assembly/reassembly points and nominal
/// strength. Current membership is derived from `DroneRecord::swarm_id`
/// across World State, never stored here (spec §4.1 notes on
/// avoiding a second source of truth for mutable counts).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwarmConfig {
    pub id: SwarmId,
    pub assembly_point: Position,
    pub reassembly_point: Position,
    pub nominal_count: usize,
}

pub fn default_swarms() -> Vec<SwarmConfig> {
    (0..NUM_SWARMS as u32)
        .map(|id| SwarmConfig {
            id,
            assembly_point: ASSEMBLY_POINTS[id as usize],
            reassembly_point: REASSEMBLY_POINTS[id as usize],
            nominal_count: DRONES_PER_SWARM,
        })
        .collect()
}

/// Launch truck: a static spawn origin, supplemented from
/// `original_source/drone_wars2.c`. Has no behavioural role beyond
/// seeding initial position and the mission report (SPEC_FULL.md §4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Truck {
    pub id: TruckId,
    pub position: Position,
}

pub fn default_trucks() -> Vec<Truck> {
    (0..TRUCK_POINTS.len() as u32)
        .map(|id| Truck { id, position: TRUCK_POINTS[id as usize] })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveState {
    Intact,
    Partial,
    Destroyed,
}

/// Static objective configuration plus the mutable rollup described
/// in SPEC_FULL.md §2/§4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveRecord {
    pub id: ObjectiveId,
    pub position: Position,
    pub nominal_attackers: usize,
    pub detonations: usize,
    pub state: ObjectiveState,
}

impl ObjectiveRecord {
    pub fn new(id: ObjectiveId, position: Position) -> Self {
        Self {
            id,
            position,
            nominal_attackers: ATTACK_DRONES_PER_SWARM,
            detonations: 0,
            state: ObjectiveState::Intact,
        }
    }

    pub fn record_detonation(&mut self) {
        self.detonations += 1;
        self.state = if self.detonations * 2 >= self.nominal_attackers {
            ObjectiveState::Destroyed
        } else {
            ObjectiveState::Partial
        };
    }
}

pub fn default_objectives() -> Vec<ObjectiveRecord> {
    (0..OBJECTIVE_POINTS.len() as u32)
        .map(|id| ObjectiveRecord::new(id, OBJECTIVE_POINTS[id as usize]))
        .collect()
}

/// Enemy defence battery (spec §3, §4.4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DefenceRecord {
    pub id: DefenceId,
    pub position: Position,
    pub hit_probability_pct: u8,
}

pub fn default_defences(hit_probability_pct: u8) -> Vec<DefenceRecord> {
    (0..DEFENCE_POINTS.len() as u32)
        .map(|id| DefenceRecord {
            id,
            position: DEFENCE_POINTS[id as usize],
            hit_probability_pct,
        })
        .collect()
}
