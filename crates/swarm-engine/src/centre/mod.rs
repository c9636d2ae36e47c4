//! Command Centre: the mission-phase state machine (spec §4.5), the
//! retasking algorithm's call site (§4.6), and failure semantics (§4.7).

mod targeting;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use swarm_core::command::{Command, CommandKind};
use swarm_core::config::MissionConfig;
use swarm_core::event::{CamReportResult, EventKind};
use swarm_core::model::{
    default_defences, default_objectives, default_swarms, default_trucks, DroneId, DroneRecord,
    ObjectiveId, ObjectiveRecord, Role, SwarmId, ATTACK_DRONES_PER_SWARM, DRONES_PER_SWARM,
};
use swarm_core::phase::Phase;
use swarm_core::retask::{retask, RetaskCandidate};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::agent::{self, AgentContext, MissionTiming};
use crate::defence;
use crate::report::{CamReportRecord, MissionReport};
use crate::transport::{CommandChannels, EventBus, COMMAND_CHANNEL_CAPACITY, EVENT_BUS_CAPACITY};
use crate::world::{Mutation, WorldState};

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mission: MissionConfig,
    /// Wall-clock duration of one simulation tick. Spec.md's "one
    /// second" (comms link-flap interval, `Z` timeout) and "tick" are
    /// treated as the same quantum - see DESIGN.md.
    pub tick_period: Duration,
    /// Real wall-clock period between defence sampler passes
    /// (spec.md §4.4: "e.g. every 200ms" - a literal duration, not a
    /// tick count).
    pub defence_sample_period: Duration,
    pub proceed_timeout_ticks: u64,
    /// Safety net so a misconfigured run can never hang forever;
    /// not part of spec.md's phase predicates (see DESIGN.md).
    pub mission_deadline: Option<Duration>,
    pub defence_seed: u64,
    pub link_seed: u64,
    pub permutation_seed: u64,
    pub spawn_seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mission: MissionConfig::default(),
            tick_period: Duration::from_millis(20),
            defence_sample_period: Duration::from_millis(200),
            proceed_timeout_ticks: 10,
            mission_deadline: Some(Duration::from_secs(30)),
            defence_seed: 1,
            link_seed: 2,
            permutation_seed: 3,
            spawn_seed: 4,
        }
    }
}

pub async fn run_mission(run: RunConfig) -> MissionReport {
    let swarms = default_swarms();
    let trucks = default_trucks();
    let objectives = default_objectives();
    let defences = default_defences(run.mission.defence_hit_pct);

    let mut spawn_rng = StdRng::seed_from_u64(run.spawn_seed);
    let initial_drones = spawn_drones(&swarms, &trucks, run.mission.fuel, &mut spawn_rng);

    let camera_ids: HashSet<DroneId> =
        initial_drones.iter().filter(|d| d.role == Role::Camera).map(|d| d.id).collect();

    let world = Arc::new(WorldState::new(initial_drones));
    let (event_bus, mut event_rx) = EventBus::channel(EVENT_BUS_CAPACITY);
    let commands = Arc::new(CommandChannels::new());
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let swarms_arc = Arc::new(swarms.clone());

    let timing = MissionTiming {
        tick_period: run.tick_period,
        link_loss_pct: run.mission.link_loss_pct,
        reconnect_timeout_ticks: run.mission.reconnect_timeout_secs,
        speed: run.mission.speed,
    };

    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    for drone_id in 0..world.len() as DroneId {
        let command_rx = commands.register(drone_id, COMMAND_CHANNEL_CAPACITY);
        let ctx = Arc::new(AgentContext {
            drone_id,
            world: world.clone(),
            events: event_bus.clone(),
            swarms: swarms_arc.clone(),
            timing,
            shutdown: shutdown_tx.clone(),
            rng_seed: run.link_seed.wrapping_add(drone_id as u64),
        });
        handles.extend(agent::spawn(ctx, command_rx));
    }

    for (i, battery) in defences.iter().enumerate() {
        let handle = tokio::spawn(defence::run(
            *battery,
            world.clone(),
            event_bus.clone(),
            run.defence_sample_period,
            run.defence_seed.wrapping_add(i as u64),
            shutdown_tx.subscribe(),
        ));
        handles.push(handle);
    }

    // Once every agent and sampler above holds its own clone, drop
    // the Centre's writer handle: the bus stays open exactly as long
    // as something could still emit on it.
    drop(event_bus);

    // Spawn --all agents registered--> Takeoff: registration above is
    // synchronous, so the transition fires immediately.
    let mut phase = Phase::Takeoff;
    commands.broadcast(Command::new(CommandKind::Takeoff)).await;
    tracing::info!(?phase, "mission phase advanced");

    let mut ready: HashMap<SwarmId, HashSet<DroneId>> = swarms.iter().map(|s| (s.id, HashSet::new())).collect();
    let mut arrived_reassembly: HashSet<DroneId> = HashSet::new();
    let mut camera_terminal: HashSet<DroneId> = HashSet::new();
    let mut drone_objective: HashMap<DroneId, ObjectiveId> = HashMap::new();
    let mut objectives: Vec<ObjectiveRecord> = objectives;
    let mut cam_reports: Vec<CamReportRecord> = Vec::new();

    let mut proceed_deadline: Option<Instant> = None;
    let mission_deadline = run.mission_deadline.map(|d| Instant::now() + d);
    let mut watchdog = tokio::time::interval(run.tick_period);
    let mut ticks_elapsed: u64 = 0;
    let mut forced_shutdown = false;
    let mut permutation_rng = StdRng::seed_from_u64(run.permutation_seed);

    'phase_loop: loop {
        tokio::select! {
            biased;
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    None => {
                        tracing::warn!("event bus closed before mission reached Done");
                        break 'phase_loop;
                    }
                    Some(event) => {
                        tracing::debug!(kind = ?event.kind, drone_id = event.drone_id, "event received");
                        match event.kind {
                            EventKind::Ready => {
                                ready.entry(event.swarm_id).or_default().insert(event.drone_id);
                            }
                            EventKind::AtReassembly => {
                                arrived_reassembly.insert(event.drone_id);
                            }
                            EventKind::Detonated => {
                                if let Some(objective_id) = drone_objective.get(&event.drone_id) {
                                    if let Some(objective) = objectives.iter_mut().find(|o| o.id == *objective_id) {
                                        objective.record_detonation();
                                    }
                                }
                            }
                            EventKind::CamReport => {
                                let result = if event.data == 0 { CamReportResult::Destroyed } else { CamReportResult::Partial };
                                cam_reports.push(CamReportRecord { drone_id: event.drone_id, swarm_id: event.swarm_id, result });
                                camera_terminal.insert(event.drone_id);
                            }
                            EventKind::Destroyed | EventKind::FuelEmpty | EventKind::DroneLost => {
                                if camera_ids.contains(&event.drone_id) {
                                    camera_terminal.insert(event.drone_id);
                                }
                            }
                            EventKind::LinkLost | EventKind::LinkRestored | EventKind::AtTarget => {}
                        }

                        if phase == Phase::Takeoff && all_swarms_ready(&swarms, &ready) {
                            phase = Phase::Proceed;
                            proceed_deadline = Some(Instant::now() + run.tick_period * run.proceed_timeout_ticks as u32);
                            commands.broadcast(Command::new(CommandKind::Proceed)).await;
                            tracing::info!(?phase, "mission phase advanced");
                        } else if phase == Phase::Proceed && proceed_predicate_met(&world, &arrived_reassembly) {
                            run_retask_and_attack(&world, &swarms, &objectives, &commands, &mut drone_objective, &mut permutation_rng).await;
                            phase = Phase::Attack;
                            tracing::info!(?phase, "mission phase advanced");
                        } else if phase == Phase::Attack && camera_terminal.len() >= camera_ids.len() {
                            break 'phase_loop;
                        }
                    }
                }
            }
            _ = watchdog.tick() => {
                ticks_elapsed += 1;
                if phase == Phase::Proceed {
                    if let Some(deadline) = proceed_deadline {
                        if Instant::now() >= deadline {
                            run_retask_and_attack(&world, &swarms, &objectives, &commands, &mut drone_objective, &mut permutation_rng).await;
                            phase = Phase::Attack;
                            tracing::info!(?phase, reason = "timeout", "mission phase advanced");
                        }
                    }
                }
                if phase == Phase::Attack && camera_terminal.len() >= camera_ids.len() {
                    break 'phase_loop;
                }
                if let Some(deadline) = mission_deadline {
                    if Instant::now() >= deadline {
                        tracing::error!("mission exceeded its wall-clock deadline; forcing shutdown");
                        forced_shutdown = true;
                        break 'phase_loop;
                    }
                }
            }
        }
    }

    commands.broadcast(Command::new(CommandKind::Shutdown)).await;
    let _ = shutdown_tx.send(());
    for handle in handles {
        let _ = handle.await;
    }

    let final_drones = world.iterate_all();
    MissionReport::build(&final_drones, objectives, cam_reports, ticks_elapsed, forced_shutdown)
}

fn spawn_drones(
    swarms: &[swarm_core::model::SwarmConfig],
    trucks: &[swarm_core::model::Truck],
    fuel: i64,
    rng: &mut impl rand::Rng,
) -> Vec<DroneRecord> {
    let mut drones = Vec::with_capacity(swarms.len() * DRONES_PER_SWARM);
    let mut id: DroneId = 0;
    for swarm in swarms {
        let truck = trucks[swarm.id as usize % trucks.len()];
        for slot in 0..DRONES_PER_SWARM {
            let role = if slot < ATTACK_DRONES_PER_SWARM { Role::Attack } else { Role::Camera };
            let jitter = rng.random_range(0..6);
            drones.push(DroneRecord::new(id, truck.id, swarm.id, role, truck.position, fuel, jitter));
            id += 1;
        }
    }
    drones
}

fn all_swarms_ready(swarms: &[swarm_core::model::SwarmConfig], ready: &HashMap<SwarmId, HashSet<DroneId>>) -> bool {
    swarms.iter().all(|s| ready.get(&s.id).map(|set| set.len()).unwrap_or(0) >= s.nominal_count)
}

fn proceed_predicate_met(world: &WorldState, arrived_reassembly: &HashSet<DroneId>) -> bool {
    let alive = world.iterate_active().len();
    let threshold = (alive / 2).max(1);
    arrived_reassembly.len() >= threshold
}

async fn run_retask_and_attack(
    world: &WorldState,
    swarms: &[swarm_core::model::SwarmConfig],
    objectives: &[ObjectiveRecord],
    commands: &CommandChannels,
    drone_objective: &mut HashMap<DroneId, ObjectiveId>,
    permutation_rng: &mut StdRng,
) {
    let swarm_ids: Vec<SwarmId> = swarms.iter().map(|s| s.id).collect();
    let nominal = swarms.first().map(|s| s.nominal_count).unwrap_or(DRONES_PER_SWARM);

    let candidates: Vec<RetaskCandidate> = world
        .iterate_active()
        .into_iter()
        .filter(|d| d.past_reassembly_threshold())
        .map(|d| RetaskCandidate { drone_id: d.id, swarm_id: d.swarm_id, role: d.role })
        .collect();

    let reassignments = retask(&candidates, &swarm_ids, nominal);
    for reassignment in &reassignments {
        world.mutate(reassignment.drone_id, Mutation::SetSwarm(reassignment.to_swarm));
        let _ = commands.send(reassignment.drone_id, Command::new(CommandKind::SetSwarm { swarm_id: reassignment.to_swarm })).await;
        tracing::info!(drone_id = reassignment.drone_id, from = reassignment.from_swarm, to = reassignment.to_swarm, "retasked");
    }

    let assignment = targeting::assign_targets(swarms, objectives, permutation_rng);

    for drone in world.iterate_active() {
        let Some(&objective_id) = assignment.get(&drone.swarm_id) else { continue };
        let Some(objective) = objectives.iter().find(|o| o.id == objective_id) else { continue };
        drone_objective.insert(drone.id, objective_id);
        let _ = commands
            .send(drone.id, Command::new(CommandKind::SetTarget { position: objective.position }))
            .await;
    }

    commands.broadcast(Command::new(CommandKind::GoAttack)).await;
}
