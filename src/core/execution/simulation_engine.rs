use crate::core::errors::SimError;
use crate::core::execution::cycle_engine::CycleEngine;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable flag that asks a running [`SimulationEngine`] to stop.
///
/// The flag is only checked between steps; a step in progress always
/// completes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

pub struct SimulationEngine {
    cycle_engine: CycleEngine,
    max_steps: Option<u64>,
    stop: StopHandle,
}

impl SimulationEngine {
    pub fn new(cycle_engine: CycleEngine, max_steps: Option<u64>) -> Self {
        Self {
            cycle_engine,
            max_steps,
            stop: StopHandle::default(),
        }
    }

    /// Share an existing stop flag, e.g. one captured by a behavior
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for stopping the run from another thread or a behavior
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run until the step limit is reached or a stop is requested.
    ///
    /// Without a step limit the run only ends through the stop handle.
    /// Returns the number of steps executed so far.
    pub fn run(&mut self) -> Result<u64, SimError> {
        while !self.stop.is_stopped()
            && self
                .max_steps
                .map_or(true, |max| self.current_step() < max)
        {
            self.step()?;
        }
        info!("Run ended at step {}", self.current_step());
        Ok(self.current_step())
    }

    /// Run exactly `steps` steps unless a stop is requested
    pub fn run_steps(&mut self, steps: u64) -> Result<u64, SimError> {
        for _ in 0..steps {
            if self.stop.is_stopped() {
                break;
            }
            self.step()?;
        }
        Ok(self.current_step())
    }

    pub fn step(&mut self) -> Result<(), SimError> {
        self.cycle_engine.step()
    }

    pub fn current_step(&self) -> u64 {
        self.cycle_engine.current_step()
    }

    pub fn cycle_engine(&self) -> &CycleEngine {
        &self.cycle_engine
    }

    pub fn cycle_engine_mut(&mut self) -> &mut CycleEngine {
        &mut self.cycle_engine
    }

    /// Flush waveform output and hand back the cycle engine
    pub fn finish(mut self) -> Result<CycleEngine, SimError> {
        self.cycle_engine.finish()?;
        Ok(self.cycle_engine)
    }
}
