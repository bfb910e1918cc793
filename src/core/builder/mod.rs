pub mod hierarchy;
pub mod simulation_builder;

pub use hierarchy::{Endpoint, PartInfo, PortInfo};
pub use simulation_builder::Simulation;
