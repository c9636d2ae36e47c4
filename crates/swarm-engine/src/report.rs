//! Mission summary, supplemented from the final per-swarm tally the
//! original C source logs at shutdown (SPEC_FULL.md §4).

use serde::Serialize;
use swarm_core::event::CamReportResult;
use swarm_core::model::{DroneId, DroneRecord, Liveness, ObjectiveRecord, Role, SwarmId};

#[derive(Debug, Clone, Serialize)]
pub struct CamReportRecord {
    pub drone_id: DroneId,
    pub swarm_id: SwarmId,
    pub result: CamReportResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwarmTally {
    pub swarm_id: SwarmId,
    pub attack_total: usize,
    pub camera_total: usize,
    pub detonated: usize,
    pub destroyed: usize,
    pub fuel_empty: usize,
    pub link_lost: usize,
    pub mission_complete: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionReport {
    pub ticks_elapsed: u64,
    pub swarms: Vec<SwarmTally>,
    pub objectives: Vec<ObjectiveRecord>,
    pub cam_reports: Vec<CamReportRecord>,
    pub forced_shutdown: bool,
}

impl MissionReport {
    pub fn build(drones: &[DroneRecord], objectives: Vec<ObjectiveRecord>, cam_reports: Vec<CamReportRecord>, ticks_elapsed: u64, forced_shutdown: bool) -> Self {
        let mut swarm_ids: Vec<SwarmId> = drones.iter().map(|d| d.swarm_id).collect();
        swarm_ids.sort_unstable();
        swarm_ids.dedup();

        let swarms = swarm_ids
            .into_iter()
            .map(|swarm_id| {
                let members: Vec<&DroneRecord> = drones.iter().filter(|d| d.swarm_id == swarm_id).collect();
                SwarmTally {
                    swarm_id,
                    attack_total: members.iter().filter(|d| d.role == Role::Attack).count(),
                    camera_total: members.iter().filter(|d| d.role == Role::Camera).count(),
                    detonated: members.iter().filter(|d| d.liveness == Liveness::Detonated).count(),
                    destroyed: members.iter().filter(|d| d.liveness == Liveness::Destroyed).count(),
                    fuel_empty: members.iter().filter(|d| d.liveness == Liveness::FuelEmpty).count(),
                    link_lost: members.iter().filter(|d| d.liveness == Liveness::LinkLost).count(),
                    mission_complete: members.iter().filter(|d| d.liveness == Liveness::MissionComplete).count(),
                }
            })
            .collect();

        Self { ticks_elapsed, swarms, objectives, cam_reports, forced_shutdown }
    }
}
