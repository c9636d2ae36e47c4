//! Event Bus record types (spec §4.2).

use serde::{Deserialize, Serialize};

use crate::model::{DroneId, SwarmId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Ready,
    AtReassembly,
    AtTarget,
    Destroyed,
    Detonated,
    FuelEmpty,
    CamReport,
    LinkLost,
    LinkRestored,
    DroneLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CamReportResult {
    Destroyed,
    Partial,
}

/// `data` doubles as the `CamReport` result discriminant
/// (0 = Destroyed, 1 = Partial) to match the flat `{kind, drone_id,
/// swarm_id, data, message}` wire shape of spec.md §6; `message` is
/// capped at 64 chars there too, which `Event::new` enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub drone_id: DroneId,
    pub swarm_id: SwarmId,
    pub data: i64,
    pub message: String,
}

impl Event {
    pub fn new(kind: EventKind, drone_id: DroneId, swarm_id: SwarmId, data: i64, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.len() > 64 {
            message.truncate(64);
        }
        Self { kind, drone_id, swarm_id, data, message }
    }

    pub fn cam_report(drone_id: DroneId, swarm_id: SwarmId, result: CamReportResult, message: impl Into<String>) -> Self {
        let data = match result {
            CamReportResult::Destroyed => 0,
            CamReportResult::Partial => 1,
        };
        Self::new(EventKind::CamReport, drone_id, swarm_id, data, message)
    }
}
