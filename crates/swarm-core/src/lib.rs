//! Core domain model, geometry, and phase/state machines for the
//! swarm-mission simulator. No I/O beyond reading a config file path;
//! no tokio. See `swarm-engine` for the concurrent coordination core.

pub mod command;
pub mod config;
pub mod event;
pub mod geometry;
pub mod model;
pub mod phase;
pub mod retask;
pub mod shuffle;
