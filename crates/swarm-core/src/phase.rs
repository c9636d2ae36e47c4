//! Command Centre mission-phase state machine (spec §4.5).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Spawn,
    Takeoff,
    Proceed,
    Retask,
    Attack,
    Shutdown,
    Done,
}

impl Phase {
    /// The phase that strictly follows this one in spec.md §4.5's
    /// fixed order. Returns `None` for `Done`, the terminal phase.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Spawn => Some(Phase::Takeoff),
            Phase::Takeoff => Some(Phase::Proceed),
            Phase::Proceed => Some(Phase::Retask),
            Phase::Retask => Some(Phase::Attack),
            Phase::Attack => Some(Phase::Shutdown),
            Phase::Shutdown => Some(Phase::Done),
            Phase::Done => None,
        }
    }
}
