use crate::core::builder::hierarchy::{self, Endpoint, PartInfo};
use crate::core::components::instance::PartInstance;
use crate::core::connections::ConnectionManager;
use crate::core::errors::SimError;
use crate::core::events::EventQueue;
use crate::core::execution::config::ExecutionStrategy;
use crate::core::values::Value;
use crate::core::waveform::{WaveRecord, WaveformMonitor};
use log::{debug, info, trace};
use rayon::prelude::*;

/// Per-step data shared by every part visited during the step
struct StepEnv<'a> {
    step: u64,
    connections: &'a ConnectionManager,
}

/// Steps an elaborated design.
///
/// One call to [`step`](Self::step) evaluates the root part, which in turn
/// steps its children according to its execution strategy. Monitors sample
/// once the root has committed.
pub struct CycleEngine {
    /// Parts in pre-order; index 0 is the root
    parts: Vec<PartInstance>,
    connections: ConnectionManager,
    /// Dedicated pool for concurrent strategies, global pool when `None`
    pool: Option<rayon::ThreadPool>,
    monitors: Vec<WaveformMonitor>,
    current_step: u64,
}

impl CycleEngine {
    pub(crate) fn new(
        parts: Vec<PartInstance>,
        connections: ConnectionManager,
        pool: Option<rayon::ThreadPool>,
        monitors: Vec<WaveformMonitor>,
    ) -> Result<Self, SimError> {
        let mut engine = Self {
            parts,
            connections,
            pool,
            monitors,
            current_step: 0,
        };
        engine.sample_monitors()?;
        Ok(engine)
    }

    /// Execute one simulation step
    pub fn step(&mut self) -> Result<(), SimError> {
        let step = self.current_step;
        debug!("=== Simulation Step {} ===", step);

        let env = StepEnv {
            step,
            connections: &self.connections,
        };
        let parts = &mut self.parts;
        match &self.pool {
            Some(pool) => pool.install(|| step_part(parts, 0, &env))?,
            None => step_part(parts, 0, &env)?,
        }

        self.sample_monitors()?;
        self.current_step += 1;
        Ok(())
    }

    fn sample_monitors(&mut self) -> Result<(), SimError> {
        for monitor in &mut self.monitors {
            monitor.sample(&self.parts)?;
        }
        Ok(())
    }

    /// Index of the next step to execute
    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    /// Current value of the port at a full dotted path
    pub fn port_value(&self, path: &str) -> Result<Value, SimError> {
        let port = hierarchy::resolve_port(&self.parts, path).map_err(|_| SimError::NotFound {
            kind: "port",
            path: path.to_string(),
        })?;
        Ok(self.parts[port.part.index()].ports[port.port].value())
    }

    /// Handle to the event queue at a full dotted path
    pub fn queue(&self, path: &str) -> Result<EventQueue, SimError> {
        match hierarchy::resolve_endpoint(&self.parts, path) {
            Ok(Endpoint::Queue(queue)) => Ok(self.parts[queue.part.index()].queues[queue.queue].clone()),
            _ => Err(SimError::NotFound {
                kind: "event queue",
                path: path.to_string(),
            }),
        }
    }

    /// Declared interface of the part at `path`
    pub fn interface(&self, path: &str) -> Result<PartInfo, SimError> {
        hierarchy::part_info(&self.parts, path).ok_or_else(|| SimError::NotFound {
            kind: "part",
            path: path.to_string(),
        })
    }

    /// Attached waveform monitors in attachment order
    pub fn monitors(&self) -> &[WaveformMonitor] {
        &self.monitors
    }

    /// Records of every monitor, in attachment order
    pub fn records(&self) -> Vec<&WaveRecord> {
        self.monitors.iter().flat_map(|m| m.records()).collect()
    }

    /// Close waveform writers
    pub fn finish(&mut self) -> Result<(), SimError> {
        for monitor in &mut self.monitors {
            monitor.close();
        }
        info!("Simulation finished after {} steps", self.current_step);
        Ok(())
    }
}

/// Step the part at `parts[0]` whose arena index is `base`. `parts` is
/// exactly the part's subtree.
fn step_part(parts: &mut [PartInstance], base: usize, env: &StepEnv<'_>) -> Result<(), SimError> {
    if !parts[0].is_ready() {
        trace!("[{}] Predicate false, skipped", parts[0].meta.path);
        return Ok(());
    }

    parts[0].peek_events();
    env.connections.deliver_events(parts, base);
    let ran = parts[0].run_behavior(env.step)?;
    trace!("[{}] Step {} behavior ran: {}", parts[0].meta.path, env.step, ran);

    if parts[0].meta.children.is_empty() {
        return Ok(());
    }
    env.connections.propagate_down(parts, base);

    match parts[0].meta.strategy {
        ExecutionStrategy::Sequential | ExecutionStrategy::Dataflow => {
            for k in 0..parts[0].meta.child_order.len() {
                let child = parts[0].meta.child_order[k];
                let offset = child.index() - base;
                let len = parts[offset].meta.subtree_len;
                step_part(&mut parts[offset..offset + len], child.index(), env)?;
                env.connections.propagate_outgoing(parts, base, child);
            }
        }
        ExecutionStrategy::Concurrent => {
            let mut chunks = Vec::with_capacity(parts[0].meta.children.len());
            let mut rest = &mut parts[1..];
            let mut next = base + 1;
            while !rest.is_empty() {
                let len = rest[0].meta.subtree_len;
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(len);
                chunks.push((next, chunk));
                next += len;
                rest = tail;
            }
            chunks
                .into_par_iter()
                .try_for_each(|(offset, chunk)| step_part(chunk, offset, env))?;

            for k in 0..parts[0].meta.children.len() {
                let child = parts[0].meta.children[k];
                env.connections.propagate_outgoing(parts, base, child);
            }
        }
    }
    Ok(())
}
