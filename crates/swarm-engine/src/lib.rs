//! Coordination core: World State, Event Bus, Command Channels, Drone
//! Agents, the Defence Sampler and the Command Centre phase machine.

pub mod agent;
pub mod centre;
pub mod defence;
pub mod report;
pub mod transport;
pub mod world;

pub use centre::{run_mission, RunConfig};
pub use report::MissionReport;
