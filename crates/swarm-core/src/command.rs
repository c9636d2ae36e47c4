//! Command Channel record types (spec §4.2).

use serde::{Deserialize, Serialize};

use crate::model::{Position, SwarmId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CommandKind {
    Takeoff,
    Proceed,
    GoAttack,
    SetSwarm { swarm_id: SwarmId },
    SetTarget { position: Position },
    Shutdown,
}

/// A command as delivered on a drone's channel. Flattened `data`/
/// `data2` fields from spec.md §6 are folded into `CommandKind`'s
/// variant payloads - an implementer choice spec.md §6 explicitly
/// leaves open ("not an inter-process ABI constraint").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self { kind }
    }
}
