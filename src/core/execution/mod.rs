pub mod config;
pub mod cycle_engine;
pub mod execution_order;
pub mod simulation_engine;

// Re-export commonly used types
pub use config::{ExecutionStrategy, SimulationConfig};
pub use cycle_engine::CycleEngine;
pub use execution_order::ExecutionOrderBuilder;
pub use simulation_engine::{SimulationEngine, StopHandle};
